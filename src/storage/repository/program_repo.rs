use crate::api::{NewProgram, Program};
use crate::storage::entity::program::{
    self, ActiveModel as ProgramActiveModel, Entity as ProgramEntity, Model as ProgramModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl From<ProgramModel> for Program {
    fn from(model: ProgramModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            code: model.code,
            description: model.description,
            is_predefined: model.is_predefined,
            is_active: model.is_active,
        }
    }
}

pub struct ProgramRepository;

impl ProgramRepository {
    /// 预置项在前，其余按名称排序
    pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<ProgramModel>, sea_orm::DbErr> {
        ProgramEntity::find()
            .filter(program::Column::IsActive.eq(true))
            .order_by_desc(program::Column::IsPredefined)
            .order_by_asc(program::Column::Name)
            .all(db)
            .await
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: &str,
    ) -> Result<Option<ProgramModel>, sea_orm::DbErr> {
        ProgramEntity::find_by_id(id.to_string()).one(db).await
    }

    pub async fn find_by_code(
        db: &DatabaseConnection,
        code: &str,
    ) -> Result<Option<ProgramModel>, sea_orm::DbErr> {
        ProgramEntity::find()
            .filter(program::Column::Code.eq(code))
            .one(db)
            .await
    }

    pub async fn insert(
        db: &DatabaseConnection,
        new: NewProgram,
    ) -> Result<ProgramModel, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let active_model = ProgramActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            name: Set(new.name),
            code: Set(new.code),
            description: Set(new.description),
            is_predefined: Set(new.is_predefined),
            is_active: Set(new.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        active_model.insert(db).await
    }

    pub async fn count(db: &DatabaseConnection) -> Result<u64, sea_orm::DbErr> {
        use sea_orm::PaginatorTrait;
        ProgramEntity::find().count(db).await
    }
}
