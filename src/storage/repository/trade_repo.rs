use crate::api::{NewTrade, Trade};
use crate::storage::entity::trade::{
    self, ActiveModel as TradeActiveModel, Entity as TradeEntity, Model as TradeModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl From<TradeModel> for Trade {
    fn from(model: TradeModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            program_id: model.program_id,
            description: model.description,
            is_predefined: model.is_predefined,
            is_active: model.is_active,
        }
    }
}

pub struct TradeRepository;

impl TradeRepository {
    /// program_id 为 None 时返回全部激活的 trade
    pub async fn list_active(
        db: &DatabaseConnection,
        program_id: Option<&str>,
    ) -> Result<Vec<TradeModel>, sea_orm::DbErr> {
        let mut query = TradeEntity::find().filter(trade::Column::IsActive.eq(true));
        if let Some(pid) = program_id {
            query = query.filter(trade::Column::ProgramId.eq(pid));
        }
        query
            .order_by_asc(trade::Column::ProgramId)
            .order_by_desc(trade::Column::IsPredefined)
            .order_by_asc(trade::Column::Name)
            .all(db)
            .await
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: &str,
    ) -> Result<Option<TradeModel>, sea_orm::DbErr> {
        TradeEntity::find_by_id(id.to_string()).one(db).await
    }

    pub async fn find_by_code(
        db: &DatabaseConnection,
        program_id: &str,
        code: &str,
    ) -> Result<Option<TradeModel>, sea_orm::DbErr> {
        TradeEntity::find()
            .filter(trade::Column::ProgramId.eq(program_id))
            .filter(trade::Column::Code.eq(code))
            .one(db)
            .await
    }

    pub async fn insert(db: &DatabaseConnection, new: NewTrade) -> Result<TradeModel, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let active_model = TradeActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(new.name),
            code: Set(new.code),
            program_id: Set(new.program_id),
            description: Set(new.description),
            is_predefined: Set(new.is_predefined),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        active_model.insert(db).await
    }
}
