pub mod form;
pub mod local;
pub mod remote;
pub mod types;

#[cfg(test)]
pub mod testing;

use async_trait::async_trait;

pub use form::{FormData, MediaFile};
pub use local::LocalBackend;
pub use remote::RemoteBackend;
pub use types::{
    department_href, Department, GalleryItem, MediaType, NewProgram, NewTrade, Program, Trade,
};

use crate::hierarchy::ProgramNode;

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Http(e.to_string())
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(e: sea_orm::DbErr) -> Self {
        ApiError::Storage(e.to_string())
    }
}

/// 学院网站后端的资源接口（programs / trades / departments / gallery）
///
/// 远程实现走 REST，本地实现直接落 SQLite；两者语义一致。
#[async_trait]
pub trait CollegeApi: Send + Sync {
    async fn list_programs(&self) -> Result<Vec<Program>, ApiError>;
    async fn get_program(&self, id: &str) -> Result<Program, ApiError>;
    /// 后端预先拼好的 Program → Trade → Department 三级树
    async fn program_hierarchy(&self) -> Result<Vec<ProgramNode>, ApiError>;
    async fn create_program(&self, program: NewProgram) -> Result<Program, ApiError>;

    async fn list_trades(&self, program_id: Option<&str>) -> Result<Vec<Trade>, ApiError>;
    async fn get_trade(&self, id: &str) -> Result<Trade, ApiError>;
    async fn create_trade(&self, trade: NewTrade) -> Result<Trade, ApiError>;

    async fn list_departments(&self) -> Result<Vec<Department>, ApiError>;
    async fn get_department(&self, id: &str) -> Result<Department, ApiError>;
    async fn create_department(&self, form: FormData) -> Result<Department, ApiError>;
    async fn update_department(&self, id: &str, form: FormData) -> Result<Department, ApiError>;
    async fn delete_department(&self, id: &str) -> Result<(), ApiError>;

    async fn list_gallery_items(
        &self,
        department_id: Option<&str>,
    ) -> Result<Vec<GalleryItem>, ApiError>;
    async fn create_gallery_item(&self, form: FormData) -> Result<GalleryItem, ApiError>;
}
