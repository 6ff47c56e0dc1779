use crate::api::Department;
use crate::storage::entity::department::{
    self, ActiveModel as DepartmentActiveModel, Entity as DepartmentEntity,
    Model as DepartmentModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// 写入 departments 表的一行（不含 id 与时间戳）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepartmentRecord {
    pub program_id: String,
    pub trade_id: Option<String>,
    pub is_direct_branch: bool,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub head_name: Option<String>,
    pub contact_email: Option<String>,
    pub hero_image: Option<String>,
    pub mission: Option<String>,
    pub vision: Option<String>,
    pub location_details: Option<String>,
    pub facilities: Vec<String>,
    pub programs_offered: Vec<String>,
    pub achievements: Vec<String>,
    pub is_active: bool,
}

impl DepartmentRecord {
    pub fn slug(&self) -> String {
        self.code.trim().to_lowercase()
    }
}

fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_string())
}

impl From<DepartmentModel> for Department {
    fn from(model: DepartmentModel) -> Self {
        Self {
            id: model.id,
            program_id: model.program_id,
            trade_id: model.trade_id,
            is_direct_branch: model.is_direct_branch,
            name: model.name,
            code: model.code,
            description: model.description,
            head_name: model.head_name,
            contact_email: model.contact_email,
            mission: model.mission,
            vision: model.vision,
            facilities: decode_list(&model.facilities_json),
            programs_offered: decode_list(&model.programs_offered_json),
            achievements: decode_list(&model.achievements_json),
            location_details: model.location_details,
            hero_image: model.hero_image,
            gallery: Vec::new(),
            is_active: model.is_active,
        }
    }
}

impl From<&DepartmentModel> for DepartmentRecord {
    fn from(model: &DepartmentModel) -> Self {
        Self {
            program_id: model.program_id.clone(),
            trade_id: model.trade_id.clone(),
            is_direct_branch: model.is_direct_branch,
            name: model.name.clone(),
            code: model.code.clone(),
            description: model.description.clone(),
            head_name: model.head_name.clone(),
            contact_email: model.contact_email.clone(),
            hero_image: model.hero_image.clone(),
            mission: model.mission.clone(),
            vision: model.vision.clone(),
            location_details: model.location_details.clone(),
            facilities: decode_list(&model.facilities_json),
            programs_offered: decode_list(&model.programs_offered_json),
            achievements: decode_list(&model.achievements_json),
            is_active: model.is_active,
        }
    }
}

pub struct DepartmentRepository;

impl DepartmentRepository {
    pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<DepartmentModel>, sea_orm::DbErr> {
        DepartmentEntity::find()
            .order_by_asc(department::Column::Name)
            .all(db)
            .await
    }

    pub async fn find_by_id(
        db: &DatabaseConnection,
        id: &str,
    ) -> Result<Option<DepartmentModel>, sea_orm::DbErr> {
        DepartmentEntity::find_by_id(id.to_string()).one(db).await
    }

    /// code 不区分大小写，slug 列上有唯一索引
    pub async fn find_by_slug(
        db: &DatabaseConnection,
        slug: &str,
    ) -> Result<Option<DepartmentModel>, sea_orm::DbErr> {
        DepartmentEntity::find()
            .filter(department::Column::Slug.eq(slug.to_lowercase()))
            .one(db)
            .await
    }

    pub async fn insert(
        db: &DatabaseConnection,
        record: DepartmentRecord,
    ) -> Result<DepartmentModel, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let active_model = DepartmentActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            slug: Set(record.slug()),
            program_id: Set(record.program_id),
            trade_id: Set(record.trade_id),
            is_direct_branch: Set(record.is_direct_branch),
            name: Set(record.name),
            code: Set(record.code),
            description: Set(record.description),
            head_name: Set(record.head_name),
            contact_email: Set(record.contact_email),
            hero_image: Set(record.hero_image),
            mission: Set(record.mission),
            vision: Set(record.vision),
            location_details: Set(record.location_details),
            facilities_json: Set(encode_list(&record.facilities)),
            programs_offered_json: Set(encode_list(&record.programs_offered)),
            achievements_json: Set(encode_list(&record.achievements)),
            is_active: Set(record.is_active),
            created_at: Set(now),
            updated_at: Set(now),
        };
        active_model.insert(db).await
    }

    pub async fn update(
        db: &DatabaseConnection,
        existing: DepartmentModel,
        record: DepartmentRecord,
    ) -> Result<DepartmentModel, sea_orm::DbErr> {
        let mut active_model: DepartmentActiveModel = existing.into();
        active_model.slug = Set(record.slug());
        active_model.program_id = Set(record.program_id);
        active_model.trade_id = Set(record.trade_id);
        active_model.is_direct_branch = Set(record.is_direct_branch);
        active_model.name = Set(record.name);
        active_model.code = Set(record.code);
        active_model.description = Set(record.description);
        active_model.head_name = Set(record.head_name);
        active_model.contact_email = Set(record.contact_email);
        active_model.hero_image = Set(record.hero_image);
        active_model.mission = Set(record.mission);
        active_model.vision = Set(record.vision);
        active_model.location_details = Set(record.location_details);
        active_model.facilities_json = Set(encode_list(&record.facilities));
        active_model.programs_offered_json = Set(encode_list(&record.programs_offered));
        active_model.achievements_json = Set(encode_list(&record.achievements));
        active_model.is_active = Set(record.is_active);
        active_model.updated_at = Set(Utc::now().timestamp());
        active_model.update(db).await
    }

    pub async fn delete(db: &DatabaseConnection, id: &str) -> Result<u64, sea_orm::DbErr> {
        let res = DepartmentEntity::delete_by_id(id.to_string()).exec(db).await?;
        Ok(res.rows_affected)
    }
}
