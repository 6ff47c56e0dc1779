use crate::api::{GalleryItem, MediaType};
use crate::storage::entity::department_gallery_image::{
    self, ActiveModel as GalleryActiveModel, Entity as GalleryEntity, Model as GalleryModel,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

impl From<GalleryModel> for GalleryItem {
    fn from(model: GalleryModel) -> Self {
        let media_type = match model.media_type.as_str() {
            "video" => MediaType::Video,
            _ => MediaType::Image,
        };
        Self {
            id: model.id,
            department_id: model.department_id,
            media_type,
            image: model.image,
            video: model.video,
            caption: model.caption,
            display_order: model.display_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryRecord {
    pub department_id: String,
    pub media_type: MediaType,
    /// 相对 media 根目录的存储路径
    pub path: String,
    pub caption: Option<String>,
    pub display_order: i32,
}

pub struct GalleryRepository;

impl GalleryRepository {
    pub async fn list(
        db: &DatabaseConnection,
        department_id: Option<&str>,
    ) -> Result<Vec<GalleryModel>, sea_orm::DbErr> {
        let mut query = GalleryEntity::find();
        if let Some(id) = department_id {
            query = query.filter(department_gallery_image::Column::DepartmentId.eq(id));
        }
        query
            .order_by_asc(department_gallery_image::Column::DisplayOrder)
            .order_by_asc(department_gallery_image::Column::CreatedAt)
            .all(db)
            .await
    }

    pub async fn insert(
        db: &DatabaseConnection,
        record: GalleryRecord,
    ) -> Result<GalleryModel, sea_orm::DbErr> {
        let now = Utc::now().timestamp();
        let (image, video) = match record.media_type {
            MediaType::Image => (Some(record.path), None),
            MediaType::Video => (None, Some(record.path)),
        };
        let active_model = GalleryActiveModel {
            id: Set(uuid::Uuid::new_v4().to_string()),
            department_id: Set(record.department_id),
            media_type: Set(record.media_type.as_str().to_string()),
            image: Set(image),
            video: Set(video),
            caption: Set(record.caption),
            display_order: Set(record.display_order),
            created_at: Set(now),
            updated_at: Set(now),
        };
        active_model.insert(db).await
    }

    /// 删除部门下全部图集记录，返回被删的行以便清理文件
    pub async fn delete_by_department(
        db: &DatabaseConnection,
        department_id: &str,
    ) -> Result<Vec<GalleryModel>, sea_orm::DbErr> {
        let rows = Self::list(db, Some(department_id)).await?;
        GalleryEntity::delete_many()
            .filter(department_gallery_image::Column::DepartmentId.eq(department_id))
            .exec(db)
            .await?;
        Ok(rows)
    }
}
