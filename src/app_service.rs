use crate::api::{ApiError, CollegeApi, Department, MediaFile, Program, Trade};
use crate::app_state::{AppEvent, DepartmentPage, DepartmentRow};
use crate::commands::{AppCommand, HELP_TEXT};
use crate::hierarchy::{department_links, DepartmentLink, HierarchyStore, ProgramNode};
use crate::wizard::{DepartmentWizard, Toast, WizardAction, WizardOutcome};
use log::{info, warn};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;

/// 层级树为空或加载失败时，退回到部门平铺链接
pub async fn load_navigation(api: &dyn CollegeApi) -> (Vec<ProgramNode>, Vec<DepartmentLink>) {
    let store = HierarchyStore::load(api).await;
    if !store.is_empty() {
        info!(
            "层级加载完成: {} 个 program, {} 个部门",
            store.programs().len(),
            store.department_count()
        );
        return (store.programs().to_vec(), Vec::new());
    }
    let links = department_links(api.list_departments().await);
    (Vec::new(), links)
}

pub fn department_rows(
    departments: Vec<Department>,
    programs: &[Program],
    trades: &[Trade],
) -> Vec<DepartmentRow> {
    let program_names: HashMap<&str, &str> = programs
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();
    let trade_names: HashMap<&str, &str> = trades
        .iter()
        .map(|t| (t.id.as_str(), t.name.as_str()))
        .collect();

    departments
        .into_iter()
        .map(|d| DepartmentRow {
            program_name: program_names
                .get(d.program_id.as_str())
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string()),
            trade_name: d
                .trade_id
                .as_deref()
                .and_then(|id| trade_names.get(id))
                .map(|n| n.to_string()),
            id: d.id,
            name: d.name,
            code: d.code,
            is_direct_branch: d.is_direct_branch,
            is_active: d.is_active,
        })
        .collect()
}

/// 三个列表并发拉取，任一失败整体失败
pub async fn load_departments(api: &dyn CollegeApi) -> Result<Vec<DepartmentRow>, ApiError> {
    let (departments, programs, trades) = futures::try_join!(
        api.list_departments(),
        api.list_programs(),
        api.list_trades(None)
    )?;
    Ok(department_rows(departments, &programs, &trades))
}

pub async fn find_department(
    api: &dyn CollegeApi,
    code: &str,
) -> Result<Option<Department>, ApiError> {
    let departments = api.list_departments().await?;
    Ok(departments.into_iter().find(|d| slug_matches(&d.code, code)))
}

/// 与 href 用同一种小写规则比较
fn slug_matches(code: &str, slug: &str) -> bool {
    code.trim().to_lowercase() == slug.trim().to_lowercase()
}

/// 部门页：按 slug 找部门，再取详情与图集
pub async fn open_department_page(
    api: &dyn CollegeApi,
    slug: &str,
) -> Result<Option<DepartmentPage>, ApiError> {
    let Some(found) = find_department(api, slug).await? else {
        return Ok(None);
    };
    let mut department = api.get_department(&found.id).await?;
    department.gallery = api.list_gallery_items(Some(&department.id)).await?;

    let program_name = match api.get_program(&department.program_id).await {
        Ok(p) => Some(p.name),
        Err(e) => {
            warn!("部门 {} 的 program 加载失败: {}", department.code, e);
            None
        }
    };
    let trade_name = match &department.trade_id {
        Some(id) => match api.get_trade(id).await {
            Ok(t) => Some(t.name),
            Err(e) => {
                warn!("部门 {} 的 trade 加载失败: {}", department.code, e);
                None
            }
        },
        None => None,
    };
    Ok(Some(DepartmentPage {
        department,
        program_name,
        trade_name,
    }))
}

/// 后台任务：持有 API 与向导，串行处理 UI 发来的命令
pub struct AppService {
    api: Arc<dyn CollegeApi>,
    wizard: Option<DepartmentWizard>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl AppService {
    pub fn new(api: Arc<dyn CollegeApi>, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            api,
            wizard: None,
            tx,
        }
    }

    fn emit(&self, event: AppEvent) {
        let _ = self.tx.send(event);
    }

    fn toast(&self, toast: Toast) {
        self.emit(AppEvent::Toast(toast));
    }

    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<AppCommand>) {
        self.refresh_navigation().await;
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd).await;
        }
        info!("命令通道关闭，后台任务退出");
    }

    async fn refresh_navigation(&self) {
        let (programs, links) = load_navigation(self.api.as_ref()).await;
        self.emit(AppEvent::Navigation { programs, links });
    }

    async fn refresh_departments(&self) {
        match load_departments(self.api.as_ref()).await {
            Ok(rows) => self.emit(AppEvent::Departments(rows)),
            Err(e) => {
                warn!("加载部门列表失败: {}", e);
                self.toast(Toast::error("Failed to fetch data"));
            }
        }
    }

    /// 把向导积攒的提示与当前快照推给 UI
    fn publish_wizard(&mut self) {
        if let Some(wizard) = self.wizard.as_mut() {
            for toast in wizard.take_toasts() {
                let _ = self.tx.send(AppEvent::Toast(toast));
            }
            let snapshot = wizard.clone();
            self.emit(AppEvent::Wizard(Box::new(snapshot)));
        }
    }

    async fn load_media(&self, paths: &[PathBuf]) -> Option<Vec<MediaFile>> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            match MediaFile::load(path).await {
                Ok(file) => files.push(file),
                Err(e) => {
                    warn!("读取文件 {} 失败: {}", path.display(), e);
                    self.toast(Toast::error(format!("Cannot read {}: {}", path.display(), e)));
                    return None;
                }
            }
        }
        Some(files)
    }

    async fn wizard_action(&mut self, action: WizardAction) {
        let api = Arc::clone(&self.api);
        let Some(wizard) = self.wizard.as_mut() else {
            self.emit(AppEvent::Error("No department wizard is open".to_string()));
            return;
        };
        let outcome = wizard.apply(api.as_ref(), action).await;
        match outcome {
            WizardOutcome::Stay => self.publish_wizard(),
            WizardOutcome::Closed => {
                self.publish_wizard();
                self.wizard = None;
                self.emit(AppEvent::WizardClosed);
            }
            WizardOutcome::Saved(department) => {
                info!("向导保存部门 {} 后关闭", department.code);
                self.publish_wizard();
                self.wizard = None;
                self.emit(AppEvent::WizardClosed);
                self.refresh_navigation().await;
                self.refresh_departments().await;
            }
        }
    }

    pub async fn handle(&mut self, cmd: AppCommand) {
        let api = Arc::clone(&self.api);
        match cmd {
            AppCommand::LoadNavigation => self.refresh_navigation().await,
            AppCommand::LoadDepartments => self.refresh_departments().await,
            AppCommand::OpenDepartment { slug } => {
                match open_department_page(api.as_ref(), &slug).await {
                    Ok(Some(page)) => self.emit(AppEvent::Page(Box::new(page))),
                    Ok(None) => self.emit(AppEvent::PageNotFound(slug)),
                    Err(e) => {
                        warn!("加载部门页 {} 失败: {}", slug, e);
                        self.toast(Toast::error("Failed to fetch department"));
                        self.emit(AppEvent::PageNotFound(slug));
                    }
                }
            }
            AppCommand::NewDepartment => {
                self.wizard = Some(DepartmentWizard::open(api.as_ref()).await);
                self.publish_wizard();
            }
            AppCommand::EditDepartment { code } => match find_department(api.as_ref(), &code).await {
                Ok(Some(department)) => {
                    self.wizard = Some(DepartmentWizard::open_edit(api.as_ref(), &department).await);
                    self.publish_wizard();
                }
                Ok(None) => {
                    self.toast(Toast::error(format!("Department {} not found", code)));
                    self.emit(AppEvent::WizardClosed);
                }
                Err(e) => {
                    warn!("查找部门 {} 失败: {}", code, e);
                    self.toast(Toast::error("Failed to fetch department"));
                    self.emit(AppEvent::WizardClosed);
                }
            },
            AppCommand::DeleteDepartment { code } => {
                let result = match find_department(api.as_ref(), &code).await {
                    Ok(Some(d)) => api.delete_department(&d.id).await,
                    Ok(None) => Err(ApiError::NotFound(code.clone())),
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => {
                        info!("部门 {} 已删除", code);
                        self.toast(Toast::success("Department deleted successfully"));
                        self.refresh_departments().await;
                        self.refresh_navigation().await;
                    }
                    Err(e) => {
                        warn!("删除部门 {} 失败: {}", code, e);
                        self.toast(Toast::error("Failed to delete department"));
                    }
                }
            }
            AppCommand::Wizard(action) => self.wizard_action(action).await,
            AppCommand::AttachHero(path) => {
                if let Some(mut files) = self.load_media(std::slice::from_ref(&path)).await {
                    if let Some(file) = files.pop() {
                        self.wizard_action(WizardAction::SetHeroFile(file)).await;
                    }
                }
            }
            AppCommand::QueueGallery(paths) => {
                if let Some(files) = self.load_media(&paths).await {
                    self.wizard_action(WizardAction::QueueGallery(files)).await;
                }
            }
            AppCommand::Help => self.emit(AppEvent::Message(HELP_TEXT.to_string())),
            AppCommand::SetLayout(_) | AppCommand::Quit => {}
            AppCommand::Unknown(msg) => self.emit(AppEvent::Error(msg)),
        }
    }
}
