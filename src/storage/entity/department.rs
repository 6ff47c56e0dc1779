use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub program_id: String,
    #[sea_orm(nullable)]
    pub trade_id: Option<String>,
    pub is_direct_branch: bool,
    pub name: String,
    pub code: String,
    pub slug: String, // code.to_lowercase()，URL 使用，唯一
    #[sea_orm(nullable)]
    pub description: Option<String>,
    #[sea_orm(nullable)]
    pub head_name: Option<String>,
    #[sea_orm(nullable)]
    pub contact_email: Option<String>,
    #[sea_orm(nullable)]
    pub hero_image: Option<String>,
    #[sea_orm(nullable)]
    pub mission: Option<String>,
    #[sea_orm(nullable)]
    pub vision: Option<String>,
    #[sea_orm(nullable)]
    pub location_details: Option<String>,

    // JSON 数组
    pub facilities_json: String,
    pub programs_offered_json: String,
    pub achievements_json: String,

    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
