pub mod form;
pub mod tag_set;

pub use form::{DepartmentForm, FormField, HeroChange};
pub use tag_set::{ChipField, ChipInput, TagSet};

use crate::api::{
    ApiError, CollegeApi, Department, FormData, MediaFile, MediaType, NewProgram, NewTrade,
    Program, Trade,
};
use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    SelectProgram,
    SelectTrade,
    Details,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        match self {
            WizardStep::SelectProgram => 1,
            WizardStep::SelectTrade => 2,
            WizardStep::Details => 3,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::SelectProgram => "Select Program",
            WizardStep::SelectTrade => "Select Trade",
            WizardStep::Details => "Department Details",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: String,
}

impl Toast {
    pub fn success(description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            title: "Success".to_string(),
            description: description.into(),
        }
    }

    pub fn error(description: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }
}

/// 向导里的用户操作
#[derive(Debug, Clone)]
pub enum WizardAction {
    SelectProgram(String),
    SetNewProgramName(String),
    CreateProgram,
    SelectTrade(String),
    DirectBranch,
    SetNewTradeName(String),
    CreateTrade,
    SetField(FormField, String),
    SetChipPending(ChipField, String),
    AddChip(ChipField),
    RemoveChip(ChipField, String),
    SetActive(bool),
    SetHeroFile(MediaFile),
    ToggleHeroRemoval,
    QueueGallery(Vec<MediaFile>),
    ClearGallery,
    Submit,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Stay,
    Closed,
    Saved(Department),
}

/// 名称转 code：大写，连续空白换成下划线
pub fn code_from_name(name: &str) -> String {
    name.to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// 三步建部门向导：Program -> Trade 或直属 -> 部门详情
#[derive(Debug, Clone)]
pub struct DepartmentWizard {
    step: WizardStep,
    programs: Vec<Program>,
    trades: Vec<Trade>,
    selected_program: Option<Program>,
    selected_trade: Option<Trade>,
    // trade 详情取不到时仍保留 id
    trade_id: Option<String>,
    is_direct_branch: bool,
    pub new_program_name: String,
    pub new_trade_name: String,
    pub form: DepartmentForm,
    gallery_queue: Vec<MediaFile>,
    next_display_order: i32,
    editing: Option<Department>,
    toasts: Vec<Toast>,
}

impl Default for DepartmentWizard {
    fn default() -> Self {
        Self {
            step: WizardStep::SelectProgram,
            programs: Vec::new(),
            trades: Vec::new(),
            selected_program: None,
            selected_trade: None,
            trade_id: None,
            is_direct_branch: false,
            new_program_name: String::new(),
            new_trade_name: String::new(),
            form: DepartmentForm::default(),
            gallery_queue: Vec::new(),
            next_display_order: 0,
            editing: None,
            toasts: Vec::new(),
        }
    }
}

impl DepartmentWizard {
    /// 新建模式：从第一步开始
    pub async fn open(api: &dyn CollegeApi) -> Self {
        let mut wizard = Self::default();
        wizard.fetch_programs(api).await;
        wizard
    }

    /// 编辑模式：取回所属 program/trade 后直接进入第三步
    pub async fn open_edit(api: &dyn CollegeApi, department: &Department) -> Self {
        let mut wizard = Self::default();
        wizard.fetch_programs(api).await;

        let department = match api.get_department(&department.id).await {
            Ok(full) => full,
            Err(e) => {
                warn!("加载部门 {} 详情失败: {}", department.id, e);
                department.clone()
            }
        };

        match api.get_program(&department.program_id).await {
            Ok(program) => wizard.selected_program = Some(program),
            Err(e) => {
                warn!("加载 program {} 失败: {}", department.program_id, e);
                wizard.toasts.push(Toast::error("Failed to fetch program"));
            }
        }
        wizard.fetch_trades(api, &department.program_id).await;
        if let Some(trade_id) = &department.trade_id {
            match api.get_trade(trade_id).await {
                Ok(trade) => wizard.selected_trade = Some(trade),
                Err(e) => {
                    warn!("加载 trade {} 失败: {}", trade_id, e);
                    wizard.toasts.push(Toast::error("Failed to fetch trade"));
                }
            }
        }
        wizard.trade_id = department.trade_id.clone();
        wizard.is_direct_branch = department.is_direct_branch;
        wizard.form = DepartmentForm::from_department(&department);
        wizard.next_display_order = next_order(&department);
        wizard.editing = Some(department);
        wizard.step = WizardStep::Details;
        wizard
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing(&self) -> Option<&Department> {
        self.editing.as_ref()
    }

    pub fn selected_program(&self) -> Option<&Program> {
        self.selected_program.as_ref()
    }

    pub fn selected_trade(&self) -> Option<&Trade> {
        self.selected_trade.as_ref()
    }

    pub fn trade_id(&self) -> Option<&str> {
        self.trade_id.as_deref()
    }

    pub fn is_direct_branch(&self) -> bool {
        self.is_direct_branch
    }

    pub fn gallery_queue(&self) -> &[MediaFile] {
        &self.gallery_queue
    }

    pub fn take_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    /// 第一步只列预置的 program
    pub fn predefined_programs(&self) -> Vec<&Program> {
        self.programs.iter().filter(|p| p.is_predefined).collect()
    }

    /// 第二步只列所选 program 下预置的 trade
    pub fn predefined_trades(&self) -> Vec<&Trade> {
        let Some(program) = &self.selected_program else {
            return Vec::new();
        };
        self.trades
            .iter()
            .filter(|t| t.is_predefined && t.program_id == program.id)
            .collect()
    }

    async fn fetch_programs(&mut self, api: &dyn CollegeApi) {
        match api.list_programs().await {
            Ok(programs) => self.programs = programs,
            Err(e) => {
                warn!("加载 programs 失败: {}", e);
                self.toasts.push(Toast::error("Failed to fetch programs"));
            }
        }
    }

    async fn fetch_trades(&mut self, api: &dyn CollegeApi, program_id: &str) {
        match api.list_trades(Some(program_id)).await {
            Ok(trades) => self.trades = trades,
            Err(e) => {
                warn!("加载 trades 失败: {}", e);
                self.toasts.push(Toast::error("Failed to fetch trades"));
            }
        }
    }

    pub async fn select_program(&mut self, api: &dyn CollegeApi, program_id: &str) {
        let Some(program) = self.programs.iter().find(|p| p.id == program_id).cloned() else {
            self.toasts.push(Toast::error("Please select a program"));
            return;
        };
        let id = program.id.clone();
        self.selected_program = Some(program);
        self.clear_placement();
        self.step = WizardStep::SelectTrade;
        self.fetch_trades(api, &id).await;
    }

    pub async fn create_program(&mut self, api: &dyn CollegeApi) {
        let name = self.new_program_name.trim().to_string();
        if name.is_empty() {
            self.toasts.push(Toast::error("Please enter a program name"));
            return;
        }
        let new = NewProgram {
            code: code_from_name(&name),
            name,
            description: None,
            is_predefined: false,
            is_active: true,
        };
        match api.create_program(new).await {
            Ok(program) => {
                info!("向导创建 program {}", program.code);
                let id = program.id.clone();
                self.selected_program = Some(program);
                self.clear_placement();
                self.new_program_name.clear();
                self.step = WizardStep::SelectTrade;
                self.fetch_programs(api).await;
                self.fetch_trades(api, &id).await;
            }
            Err(e) => {
                warn!("创建 program 失败: {}", e);
                self.toasts.push(Toast::error("Failed to create program"));
            }
        }
    }

    pub fn select_trade(&mut self, trade_id: &str) {
        let Some(trade) = self.trades.iter().find(|t| t.id == trade_id).cloned() else {
            self.toasts.push(Toast::error("Please select a trade"));
            return;
        };
        self.trade_id = Some(trade.id.clone());
        self.selected_trade = Some(trade);
        self.is_direct_branch = false;
        self.step = WizardStep::Details;
    }

    pub fn choose_direct_branch(&mut self) {
        self.selected_trade = None;
        self.trade_id = None;
        self.is_direct_branch = true;
        self.step = WizardStep::Details;
    }

    pub async fn create_trade(&mut self, api: &dyn CollegeApi) {
        let name = self.new_trade_name.trim().to_string();
        if name.is_empty() {
            self.toasts.push(Toast::error("Please enter a trade name"));
            return;
        }
        let Some(program_id) = self.selected_program.as_ref().map(|p| p.id.clone()) else {
            return;
        };
        let new = NewTrade {
            code: code_from_name(&name),
            name,
            program_id: program_id.clone(),
            description: None,
            is_predefined: false,
            is_active: true,
        };
        match api.create_trade(new).await {
            Ok(trade) => {
                info!("向导创建 trade {}", trade.code);
                self.trade_id = Some(trade.id.clone());
                self.selected_trade = Some(trade);
                self.new_trade_name.clear();
                self.is_direct_branch = false;
                self.step = WizardStep::Details;
                self.fetch_trades(api, &program_id).await;
            }
            Err(e) => {
                warn!("创建 trade 失败: {}", e);
                self.toasts.push(Toast::error("Failed to create trade"));
            }
        }
    }

    /// 返回上一步；第一步再返回即关闭向导
    pub fn back(&mut self) -> WizardOutcome {
        match self.step {
            WizardStep::SelectProgram => WizardOutcome::Closed,
            WizardStep::SelectTrade => {
                self.step = WizardStep::SelectProgram;
                WizardOutcome::Stay
            }
            WizardStep::Details => {
                self.step = WizardStep::SelectTrade;
                WizardOutcome::Stay
            }
        }
    }

    pub fn queue_gallery(&mut self, files: Vec<MediaFile>) {
        self.gallery_queue.extend(files);
    }

    fn clear_placement(&mut self) {
        self.selected_trade = None;
        self.trade_id = None;
        self.is_direct_branch = false;
    }

    /// 部门表单；trade 只在选了 trade 时出现，且与直属二选一
    pub fn build_payload(&self) -> Result<FormData, &'static str> {
        let program = self
            .selected_program
            .as_ref()
            .ok_or("Please select a program")?;
        match (&self.trade_id, self.is_direct_branch) {
            (Some(_), false) | (None, true) => {}
            (None, false) => return Err("Please select a trade or add a direct branch"),
            (Some(_), true) => return Err("A direct branch cannot belong to a trade"),
        }
        let mut data = FormData::new();
        data.append_text("program", program.id.clone());
        if let Some(trade_id) = &self.trade_id {
            data.append_text("trade", trade_id.clone());
        }
        data.append_text(
            "is_direct_branch",
            if self.is_direct_branch { "true" } else { "false" },
        );
        self.form.append_to(&mut data);
        Ok(data)
    }

    /// 按队列顺序逐个上传；成功的文件出队，失败即停
    async fn upload_gallery(
        &mut self,
        api: &dyn CollegeApi,
        department_id: &str,
    ) -> Result<usize, ApiError> {
        let mut uploaded = 0;
        while let Some(file) = self.gallery_queue.first() {
            let media_type = MediaType::from_mime(&file.mime_type);
            let mut data = FormData::new();
            data.append_text("department", department_id);
            data.append_text("media_type", media_type.as_str());
            data.append_text("display_order", self.next_display_order.to_string());
            data.append_file(media_type.as_str(), file.clone());
            api.create_gallery_item(data).await?;
            self.gallery_queue.remove(0);
            self.next_display_order += 1;
            uploaded += 1;
        }
        Ok(uploaded)
    }

    pub async fn submit(&mut self, api: &dyn CollegeApi) -> WizardOutcome {
        let payload = match self.build_payload() {
            Ok(payload) => payload,
            Err(message) => {
                self.toasts.push(Toast::error(message));
                return WizardOutcome::Stay;
            }
        };
        if let Some(message) = self.form.missing_required() {
            self.toasts.push(Toast::error(message));
            return WizardOutcome::Stay;
        }

        let (saved, success) = match self.editing.as_ref().map(|d| d.id.clone()) {
            Some(id) => match api.update_department(&id, payload).await {
                Ok(dept) => (dept, "Department updated successfully"),
                Err(e) => {
                    warn!("更新部门失败: {}", e);
                    self.toasts.push(Toast::error(e.to_string()));
                    return WizardOutcome::Stay;
                }
            },
            None => match api.create_department(payload).await {
                Ok(dept) => {
                    self.next_display_order = 0;
                    (dept, "Department created successfully")
                }
                Err(e) => {
                    warn!("创建部门失败: {}", e);
                    self.toasts.push(Toast::error(e.to_string()));
                    return WizardOutcome::Stay;
                }
            },
        };
        self.toasts.push(Toast::success(success));

        if let Err(e) = self.upload_gallery(api, &saved.id).await {
            // 部门已落库：切到编辑模式，再次提交只会更新
            warn!("部门 {} 图集上传失败: {}", saved.code, e);
            self.toasts.push(Toast::error(format!(
                "Gallery upload failed: {}",
                e
            )));
            self.form.existing_hero = saved.hero_image.clone();
            self.form.hero = HeroChange::Keep;
            self.editing = Some(saved);
            return WizardOutcome::Stay;
        }

        info!("部门 {} 已保存", saved.code);
        WizardOutcome::Saved(saved)
    }

    pub async fn apply(&mut self, api: &dyn CollegeApi, action: WizardAction) -> WizardOutcome {
        match action {
            WizardAction::SelectProgram(id) => self.select_program(api, &id).await,
            WizardAction::SetNewProgramName(name) => self.new_program_name = name,
            WizardAction::CreateProgram => self.create_program(api).await,
            WizardAction::SelectTrade(id) => self.select_trade(&id),
            WizardAction::DirectBranch => self.choose_direct_branch(),
            WizardAction::SetNewTradeName(name) => self.new_trade_name = name,
            WizardAction::CreateTrade => self.create_trade(api).await,
            WizardAction::SetField(field, value) => self.form.set_text(field, &value),
            WizardAction::SetChipPending(field, value) => {
                self.form.chips_mut(field).pending = value
            }
            WizardAction::AddChip(field) => {
                self.form.chips_mut(field).commit();
            }
            WizardAction::RemoveChip(field, value) => {
                self.form.chips_mut(field).tags.remove(&value);
            }
            WizardAction::SetActive(active) => self.form.is_active = active,
            WizardAction::SetHeroFile(file) => self.form.set_hero_file(file),
            WizardAction::ToggleHeroRemoval => self.form.toggle_hero_removal(),
            WizardAction::QueueGallery(files) => self.queue_gallery(files),
            WizardAction::ClearGallery => self.gallery_queue.clear(),
            WizardAction::Submit => return self.submit(api).await,
            WizardAction::Back => return self.back(),
        }
        WizardOutcome::Stay
    }
}

fn next_order(department: &Department) -> i32 {
    department
        .gallery
        .iter()
        .map(|g| g.display_order + 1)
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{local_backend, RecordingApi};
    use pretty_assertions::assert_eq;

    fn program_id(wizard: &DepartmentWizard, code: &str) -> String {
        wizard
            .predefined_programs()
            .into_iter()
            .find(|p| p.code == code)
            .map(|p| p.id.clone())
            .unwrap()
    }

    fn fill(wizard: &mut DepartmentWizard, name: &str, code: &str) {
        wizard.form.set_text(FormField::Name, name);
        wizard.form.set_text(FormField::Code, code);
    }

    #[test]
    fn code_generation_collapses_whitespace() {
        assert_eq!(code_from_name("School of  Design"), "SCHOOL_OF_DESIGN");
        assert_eq!(code_from_name(" b tech\t(hons) "), "B_TECH_(HONS)");
    }

    #[tokio::test]
    async fn step_two_lists_only_trades_of_selected_program() {
        let (_dir, api) = local_backend().await;
        let mut wizard = DepartmentWizard::open(&api).await;
        assert_eq!(wizard.step(), WizardStep::SelectProgram);

        let ug = program_id(&wizard, "UG");
        wizard.apply(&api, WizardAction::SelectProgram(ug.clone())).await;

        assert_eq!(wizard.step(), WizardStep::SelectTrade);
        let codes: Vec<&str> = wizard
            .predefined_trades()
            .iter()
            .map(|t| t.code.as_str())
            .collect();
        assert_eq!(codes, vec!["BARCH", "BTECH"]);
        assert!(wizard.predefined_trades().iter().all(|t| t.program_id == ug));
    }

    #[tokio::test]
    async fn direct_branch_payload_has_no_trade() {
        let (_dir, local) = local_backend().await;
        let api = RecordingApi::new(local);
        let mut wizard = DepartmentWizard::open(&api).await;
        let pg = program_id(&wizard, "PG");

        wizard.apply(&api, WizardAction::SelectProgram(pg.clone())).await;
        wizard.apply(&api, WizardAction::DirectBranch).await;
        assert_eq!(wizard.step(), WizardStep::Details);
        fill(&mut wizard, "Data Science", "ds");

        let outcome = wizard.apply(&api, WizardAction::Submit).await;
        assert!(matches!(outcome, WizardOutcome::Saved(ref d) if d.code == "DS"));

        let sent = api.last_department_form().unwrap();
        assert!(!sent.contains("trade"));
        assert_eq!(sent.text("is_direct_branch"), Some("true"));
        assert_eq!(sent.text("program"), Some(pg.as_str()));
        assert_eq!(
            wizard.take_toasts(),
            vec![Toast::success("Department created successfully")]
        );
    }

    #[tokio::test]
    async fn trade_payload_sets_trade_and_clears_direct_flag() {
        let (_dir, local) = local_backend().await;
        let api = RecordingApi::new(local);
        let mut wizard = DepartmentWizard::open(&api).await;
        let ug = program_id(&wizard, "UG");

        wizard.apply(&api, WizardAction::SelectProgram(ug)).await;
        wizard.apply(&api, WizardAction::DirectBranch).await;
        wizard.apply(&api, WizardAction::Back).await;
        let btech = wizard
            .predefined_trades()
            .into_iter()
            .find(|t| t.code == "BTECH")
            .map(|t| t.id.clone())
            .unwrap();
        wizard.apply(&api, WizardAction::SelectTrade(btech.clone())).await;
        fill(&mut wizard, "Artificial Intelligence", "AI");
        wizard.apply(&api, WizardAction::Submit).await;

        let sent = api.last_department_form().unwrap();
        assert_eq!(sent.text("trade"), Some(btech.as_str()));
        assert_eq!(sent.text("is_direct_branch"), Some("false"));
    }

    #[tokio::test]
    async fn chip_added_twice_is_sent_once() {
        let (_dir, local) = local_backend().await;
        let api = RecordingApi::new(local);
        let mut wizard = DepartmentWizard::open(&api).await;
        let pg = program_id(&wizard, "PG");
        wizard.apply(&api, WizardAction::SelectProgram(pg)).await;
        wizard.apply(&api, WizardAction::DirectBranch).await;
        fill(&mut wizard, "Law", "LAW");

        for _ in 0..2 {
            wizard
                .apply(
                    &api,
                    WizardAction::SetChipPending(ChipField::Facilities, "Library".into()),
                )
                .await;
            wizard
                .apply(&api, WizardAction::AddChip(ChipField::Facilities))
                .await;
        }
        wizard.apply(&api, WizardAction::Submit).await;

        let sent = api.last_department_form().unwrap();
        assert_eq!(sent.text("facilities"), Some(r#"["Library"]"#));
    }

    #[tokio::test]
    async fn gallery_failure_keeps_department_and_switches_to_edit() {
        let (_dir, local) = local_backend().await;
        let api = RecordingApi::new(local).failing_gallery_at(1);
        let mut wizard = DepartmentWizard::open(&api).await;
        let pg = program_id(&wizard, "PG");
        wizard.apply(&api, WizardAction::SelectProgram(pg)).await;
        wizard.apply(&api, WizardAction::DirectBranch).await;
        fill(&mut wizard, "Fine Arts", "FA");
        wizard
            .apply(
                &api,
                WizardAction::QueueGallery(vec![
                    MediaFile::new("a.png", "image/png", vec![1]),
                    MediaFile::new("b.mp4", "video/mp4", vec![2]),
                ]),
            )
            .await;

        let outcome = wizard.apply(&api, WizardAction::Submit).await;
        assert_eq!(outcome, WizardOutcome::Stay);
        assert_eq!(wizard.step(), WizardStep::Details);
        let toasts = wizard.take_toasts();
        assert_eq!(toasts.last().map(|t| t.kind), Some(ToastKind::Error));

        let listed = api.list_departments().await.unwrap();
        let created = listed.iter().find(|d| d.code == "FA").unwrap();
        assert_eq!(wizard.editing().map(|d| d.id.as_str()), Some(created.id.as_str()));
        assert_eq!(wizard.gallery_queue().len(), 1);

        // 再次提交：更新而不是重复创建，剩余文件接着上传
        let outcome = wizard.apply(&api, WizardAction::Submit).await;
        assert!(matches!(outcome, WizardOutcome::Saved(_)));
        let listed = api.list_departments().await.unwrap();
        assert_eq!(listed.iter().filter(|d| d.code == "FA").count(), 1);

        let gallery = api.list_gallery_items(Some(&created.id)).await.unwrap();
        assert_eq!(
            gallery.iter().map(|g| (g.media_type, g.display_order)).collect::<Vec<_>>(),
            vec![(MediaType::Image, 0), (MediaType::Video, 1)]
        );
    }

    #[tokio::test]
    async fn gallery_uploads_carry_type_and_order() {
        let (_dir, local) = local_backend().await;
        let api = RecordingApi::new(local);
        let mut wizard = DepartmentWizard::open(&api).await;
        let pg = program_id(&wizard, "PG");
        wizard.apply(&api, WizardAction::SelectProgram(pg)).await;
        wizard.apply(&api, WizardAction::DirectBranch).await;
        fill(&mut wizard, "Music", "MUS");
        wizard.queue_gallery(vec![
            MediaFile::new("tour.mp4", "video/mp4", vec![1]),
            MediaFile::new("hall.jpg", "image/jpeg", vec![2]),
        ]);
        wizard.submit(&api).await;

        let forms = api.gallery_forms.lock().unwrap().clone();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].text("media_type"), Some("video"));
        assert!(forms[0].file("video").is_some());
        assert_eq!(forms[0].text("display_order"), Some("0"));
        assert_eq!(forms[1].text("media_type"), Some("image"));
        assert_eq!(forms[1].text("display_order"), Some("1"));
    }

    #[tokio::test]
    async fn inline_program_creation_moves_to_step_two() {
        let (_dir, api) = local_backend().await;
        let mut wizard = DepartmentWizard::open(&api).await;

        wizard.apply(&api, WizardAction::CreateProgram).await;
        assert_eq!(
            wizard.take_toasts(),
            vec![Toast::error("Please enter a program name")]
        );
        assert_eq!(wizard.step(), WizardStep::SelectProgram);

        wizard
            .apply(&api, WizardAction::SetNewProgramName("School of Design".into()))
            .await;
        wizard.apply(&api, WizardAction::CreateProgram).await;
        assert_eq!(wizard.step(), WizardStep::SelectTrade);
        let program = wizard.selected_program().unwrap();
        assert_eq!(program.code, "SCHOOL_OF_DESIGN");
        assert!(!program.is_predefined);
        assert!(wizard.predefined_trades().is_empty());
        assert!(wizard.new_program_name.is_empty());
    }

    #[tokio::test]
    async fn inline_trade_creation_jumps_to_details() {
        let (_dir, api) = local_backend().await;
        let mut wizard = DepartmentWizard::open(&api).await;
        let ug = program_id(&wizard, "UG");
        wizard.apply(&api, WizardAction::SelectProgram(ug.clone())).await;

        wizard
            .apply(&api, WizardAction::SetNewTradeName("B Des".into()))
            .await;
        wizard.apply(&api, WizardAction::CreateTrade).await;

        assert_eq!(wizard.step(), WizardStep::Details);
        let trade = wizard.selected_trade().unwrap();
        assert_eq!(trade.code, "B_DES");
        assert_eq!(trade.program_id, ug);
        assert!(!wizard.is_direct_branch());
    }

    #[tokio::test]
    async fn edit_mode_prefills_and_updates() {
        let (_dir, api) = local_backend().await;
        let cse = api
            .list_departments()
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.code == "CSE")
            .unwrap();

        let mut wizard = DepartmentWizard::open_edit(&api, &cse).await;
        assert_eq!(wizard.step(), WizardStep::Details);
        assert!(wizard.is_editing());
        assert_eq!(wizard.selected_trade().map(|t| t.code.as_str()), Some("BTECH"));
        assert_eq!(wizard.form.name, "Computer Science & Engineering");

        wizard.form.set_text(FormField::HeadName, "Dr. Rao");
        let outcome = wizard.submit(&api).await;
        assert!(matches!(outcome, WizardOutcome::Saved(ref d) if d.id == cse.id));
        assert_eq!(
            wizard.take_toasts(),
            vec![Toast::success("Department updated successfully")]
        );

        let updated = api.get_department(&cse.id).await.unwrap();
        assert_eq!(updated.head_name.as_deref(), Some("Dr. Rao"));
        assert_eq!(updated.trade_id, cse.trade_id);
    }

    #[tokio::test]
    async fn edit_keeps_trade_when_trade_lookup_fails() {
        let (_dir, local) = local_backend().await;
        let cse = local
            .list_departments()
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.code == "CSE")
            .unwrap();
        let api = RecordingApi::new(local).failing_trade_lookup();

        let mut wizard = DepartmentWizard::open_edit(&api, &cse).await;
        assert!(wizard.selected_trade().is_none());
        assert_eq!(wizard.trade_id(), cse.trade_id.as_deref());
        assert_eq!(
            wizard.take_toasts(),
            vec![Toast::error("Failed to fetch trade")]
        );

        let outcome = wizard.submit(&api).await;
        assert!(matches!(outcome, WizardOutcome::Saved(_)));
        let sent = api.last_department_form().unwrap();
        assert_eq!(sent.text("trade"), cse.trade_id.as_deref());
        assert_eq!(sent.text("is_direct_branch"), Some("false"));
        let saved = api.get_department(&cse.id).await.unwrap();
        assert_eq!(saved.trade_id, cse.trade_id);
    }

    #[tokio::test]
    async fn submit_without_placement_is_refused() {
        let (_dir, local) = local_backend().await;
        let api = RecordingApi::new(local);
        let mut wizard = DepartmentWizard::open(&api).await;
        let ug = program_id(&wizard, "UG");
        wizard.apply(&api, WizardAction::SelectProgram(ug)).await;
        fill(&mut wizard, "Physics", "PHY");

        assert_eq!(wizard.submit(&api).await, WizardOutcome::Stay);
        assert_eq!(
            wizard.take_toasts(),
            vec![Toast::error("Please select a trade or add a direct branch")]
        );
        assert!(api.last_department_form().is_none());
    }

    #[tokio::test]
    async fn choosing_another_program_drops_previous_trade() {
        let (_dir, api) = local_backend().await;
        let mut wizard = DepartmentWizard::open(&api).await;
        let ug = program_id(&wizard, "UG");
        let pg = program_id(&wizard, "PG");
        wizard.apply(&api, WizardAction::SelectProgram(ug)).await;
        let btech = wizard
            .predefined_trades()
            .into_iter()
            .find(|t| t.code == "BTECH")
            .map(|t| t.id.clone())
            .unwrap();
        wizard.apply(&api, WizardAction::SelectTrade(btech)).await;
        wizard.apply(&api, WizardAction::Back).await;
        wizard.apply(&api, WizardAction::Back).await;

        wizard.apply(&api, WizardAction::SelectProgram(pg)).await;
        assert!(wizard.trade_id().is_none());
        assert!(wizard.selected_trade().is_none());
        assert!(!wizard.is_direct_branch());
    }

    #[tokio::test]
    async fn back_from_first_step_closes() {
        let (_dir, api) = local_backend().await;
        let mut wizard = DepartmentWizard::open(&api).await;
        let ug = program_id(&wizard, "UG");
        wizard.apply(&api, WizardAction::SelectProgram(ug)).await;

        assert_eq!(wizard.apply(&api, WizardAction::Back).await, WizardOutcome::Stay);
        assert_eq!(wizard.step(), WizardStep::SelectProgram);
        assert_eq!(wizard.apply(&api, WizardAction::Back).await, WizardOutcome::Closed);
    }

    #[tokio::test]
    async fn missing_required_fields_stay_on_details() {
        let (_dir, api) = local_backend().await;
        let mut wizard = DepartmentWizard::open(&api).await;
        let pg = program_id(&wizard, "PG");
        wizard.apply(&api, WizardAction::SelectProgram(pg)).await;
        wizard.apply(&api, WizardAction::DirectBranch).await;

        assert_eq!(wizard.submit(&api).await, WizardOutcome::Stay);
        assert_eq!(
            wizard.take_toasts(),
            vec![Toast::error("Please enter a department name")]
        );
    }
}
