use super::{
    ApiError, CollegeApi, Department, FormData, GalleryItem, LocalBackend, NewProgram, NewTrade,
    Program, Trade,
};
use crate::hierarchy::ProgramNode;
use crate::storage::{establish_connection, seed};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// 临时目录里的 SQLite 文件库 + media 目录，已写入预置数据
pub async fn local_backend() -> (TempDir, LocalBackend) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let db = establish_connection(&url).await.unwrap();
    seed::seed_if_empty(&db).await.unwrap();
    let backend = LocalBackend::new(Arc::new(db), dir.path().join("media"));
    (dir, backend)
}

pub fn department_form(
    program_id: &str,
    trade_id: Option<&str>,
    direct: bool,
    name: &str,
    code: &str,
) -> FormData {
    let mut form = FormData::new();
    form.append_text("program", program_id);
    if let Some(trade) = trade_id {
        form.append_text("trade", trade);
    }
    form.append_text("is_direct_branch", if direct { "true" } else { "false" });
    form.append_text("name", name);
    form.append_text("code", code);
    form
}

/// 记录部门与图集表单，可让第 N 次图集上传失败
pub struct RecordingApi {
    pub inner: LocalBackend,
    pub department_forms: Mutex<Vec<FormData>>,
    pub gallery_forms: Mutex<Vec<FormData>>,
    fail_gallery_at: Option<usize>,
    fail_trade_lookup: bool,
    gallery_calls: AtomicUsize,
}

impl RecordingApi {
    pub fn new(inner: LocalBackend) -> Self {
        Self {
            inner,
            department_forms: Mutex::new(Vec::new()),
            gallery_forms: Mutex::new(Vec::new()),
            fail_gallery_at: None,
            fail_trade_lookup: false,
            gallery_calls: AtomicUsize::new(0),
        }
    }

    /// 第 `index` 次（从 0 开始）图集上传返回错误
    pub fn failing_gallery_at(mut self, index: usize) -> Self {
        self.fail_gallery_at = Some(index);
        self
    }

    /// `get_trade` 一律返回错误
    pub fn failing_trade_lookup(mut self) -> Self {
        self.fail_trade_lookup = true;
        self
    }

    pub fn last_department_form(&self) -> Option<FormData> {
        self.department_forms.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CollegeApi for RecordingApi {
    async fn list_programs(&self) -> Result<Vec<Program>, ApiError> {
        self.inner.list_programs().await
    }

    async fn get_program(&self, id: &str) -> Result<Program, ApiError> {
        self.inner.get_program(id).await
    }

    async fn program_hierarchy(&self) -> Result<Vec<ProgramNode>, ApiError> {
        self.inner.program_hierarchy().await
    }

    async fn create_program(&self, program: NewProgram) -> Result<Program, ApiError> {
        self.inner.create_program(program).await
    }

    async fn list_trades(&self, program_id: Option<&str>) -> Result<Vec<Trade>, ApiError> {
        self.inner.list_trades(program_id).await
    }

    async fn get_trade(&self, id: &str) -> Result<Trade, ApiError> {
        if self.fail_trade_lookup {
            return Err(ApiError::Status {
                status: 503,
                message: "trade lookup unavailable".into(),
            });
        }
        self.inner.get_trade(id).await
    }

    async fn create_trade(&self, trade: NewTrade) -> Result<Trade, ApiError> {
        self.inner.create_trade(trade).await
    }

    async fn list_departments(&self) -> Result<Vec<Department>, ApiError> {
        self.inner.list_departments().await
    }

    async fn get_department(&self, id: &str) -> Result<Department, ApiError> {
        self.inner.get_department(id).await
    }

    async fn create_department(&self, form: FormData) -> Result<Department, ApiError> {
        self.department_forms.lock().unwrap().push(form.clone());
        self.inner.create_department(form).await
    }

    async fn update_department(&self, id: &str, form: FormData) -> Result<Department, ApiError> {
        self.department_forms.lock().unwrap().push(form.clone());
        self.inner.update_department(id, form).await
    }

    async fn delete_department(&self, id: &str) -> Result<(), ApiError> {
        self.inner.delete_department(id).await
    }

    async fn list_gallery_items(
        &self,
        department_id: Option<&str>,
    ) -> Result<Vec<GalleryItem>, ApiError> {
        self.inner.list_gallery_items(department_id).await
    }

    async fn create_gallery_item(&self, form: FormData) -> Result<GalleryItem, ApiError> {
        let call = self.gallery_calls.fetch_add(1, Ordering::SeqCst);
        self.gallery_forms.lock().unwrap().push(form.clone());
        if self.fail_gallery_at == Some(call) {
            return Err(ApiError::Status {
                status: 500,
                message: "upload rejected".into(),
            });
        }
        self.inner.create_gallery_item(form).await
    }
}
