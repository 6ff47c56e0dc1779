use crate::api::Department;
use crate::commands::{slug_from, AppCommand, HELP_TEXT};
use crate::config::NavLayout;
use crate::hierarchy::{
    DepartmentLink, DesktopNavigator, HoverTarget, MobileNavigator, ProgramNode,
};
use crate::wizard::{
    ChipField, DepartmentWizard, FormField, Toast, ToastKind, WizardAction, WizardStep,
};
use crossterm::event::{KeyCode, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ViewMode {
    Navigation,
    Departments,
    DepartmentPage,
    Wizard,
}

pub const MENU_ITEMS: [(&str, ViewMode); 4] = [
    ("Navigation", ViewMode::Navigation),
    ("Departments", ViewMode::Departments),
    ("Department Page", ViewMode::DepartmentPage),
    ("New Department", ViewMode::Wizard),
];

#[derive(PartialEq, Debug, Clone)]
pub enum InputMode {
    Normal,
    Command,
    /// 向导里单个字段的输入行
    Prompt(PromptTarget),
}

#[derive(PartialEq, Debug, Clone)]
pub enum FocusArea {
    Menu,
    MainView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptTarget {
    Field(FormField),
    Chip(ChipField),
    NewProgram,
    NewTrade,
    HeroPath,
    GalleryPaths,
}

impl PromptTarget {
    pub fn label(&self) -> String {
        match self {
            PromptTarget::Field(field) => field.label().to_string(),
            PromptTarget::Chip(field) => format!("Add to {}", field.label()),
            PromptTarget::NewProgram => "New program name".to_string(),
            PromptTarget::NewTrade => "New trade name".to_string(),
            PromptTarget::HeroPath => "Hero image path".to_string(),
            PromptTarget::GalleryPaths => "Gallery file paths (space separated)".to_string(),
        }
    }
}

/// 上一帧画出的可交互区域
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Program(String),
    ProgramPanel(String),
    Trade {
        program_id: String,
        trade_id: String,
    },
    TradePanel {
        program_id: String,
        trade_id: String,
    },
    Department {
        program_id: String,
        trade_id: Option<String>,
        href: String,
    },
    MobileRow(usize),
    Link(String),
}

impl HitTarget {
    /// 弹出面板嵌套在打开它的行里，面板内的位置也算在所属行上
    pub fn hover(&self) -> Option<HoverTarget> {
        match self {
            HitTarget::Program(p) | HitTarget::ProgramPanel(p) => Some(HoverTarget::program(p)),
            HitTarget::Trade {
                program_id,
                trade_id,
            }
            | HitTarget::TradePanel {
                program_id,
                trade_id,
            } => Some(HoverTarget::trade(program_id, trade_id)),
            HitTarget::Department {
                program_id,
                trade_id,
                ..
            } => Some(match trade_id {
                Some(t) => HoverTarget::trade(program_id, t),
                None => HoverTarget::program(program_id),
            }),
            HitTarget::MobileRow(_) | HitTarget::Link(_) => None,
        }
    }

    pub fn href(&self) -> Option<&str> {
        match self {
            HitTarget::Department { href, .. } | HitTarget::Link(href) => Some(href),
            _ => None,
        }
    }
}

fn rect_contains(rect: &Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}

/// 部门管理列表的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentRow {
    pub id: String,
    pub name: String,
    pub code: String,
    pub program_name: String,
    pub trade_name: Option<String>,
    pub is_direct_branch: bool,
    pub is_active: bool,
}

impl DepartmentRow {
    pub fn placement(&self) -> &str {
        match &self.trade_name {
            Some(name) if !self.is_direct_branch => name,
            _ => "Direct Branch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepartmentPage {
    pub department: Department,
    pub program_name: Option<String>,
    pub trade_name: Option<String>,
}

impl DepartmentPage {
    pub fn breadcrumb(&self) -> String {
        let program = self.program_name.as_deref().unwrap_or("Program");
        match (&self.trade_name, self.department.is_direct_branch) {
            (Some(trade), false) => format!("{} › {}", program, trade),
            _ => format!("{} › Direct Branch", program),
        }
    }
}

#[derive(Debug)]
pub enum AppEvent {
    Message(String),
    Error(String),
    Toast(Toast),
    Navigation {
        programs: Vec<ProgramNode>,
        links: Vec<DepartmentLink>,
    },
    Departments(Vec<DepartmentRow>),
    Page(Box<DepartmentPage>),
    PageNotFound(String),
    Wizard(Box<DepartmentWizard>),
    WizardClosed,
}

/// 向导当前步骤可选的行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardRow {
    Program { id: String, name: String },
    CreateProgram,
    Trade { id: String, name: String },
    DirectBranch,
    CreateTrade,
    Field(FormField),
    Active,
    Chips(ChipField),
    Hero,
    Gallery,
    Submit,
}

pub fn wizard_rows(wizard: &DepartmentWizard) -> Vec<WizardRow> {
    match wizard.step() {
        WizardStep::SelectProgram => {
            let mut rows: Vec<WizardRow> = wizard
                .predefined_programs()
                .into_iter()
                .map(|p| WizardRow::Program {
                    id: p.id.clone(),
                    name: p.name.clone(),
                })
                .collect();
            rows.push(WizardRow::CreateProgram);
            rows
        }
        WizardStep::SelectTrade => {
            let mut rows: Vec<WizardRow> = wizard
                .predefined_trades()
                .into_iter()
                .map(|t| WizardRow::Trade {
                    id: t.id.clone(),
                    name: t.name.clone(),
                })
                .collect();
            rows.push(WizardRow::DirectBranch);
            rows.push(WizardRow::CreateTrade);
            rows
        }
        WizardStep::Details => {
            let mut rows: Vec<WizardRow> = FormField::ALL.into_iter().map(WizardRow::Field).collect();
            rows.push(WizardRow::Active);
            rows.extend(ChipField::ALL.into_iter().map(WizardRow::Chips));
            rows.push(WizardRow::Hero);
            rows.push(WizardRow::Gallery);
            rows.push(WizardRow::Submit);
            rows
        }
    }
}

pub struct App {
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus_area: FocusArea,
    pub menu_selected_index: usize,
    pub layout: NavLayout,
    pub programs: Vec<ProgramNode>,
    pub links: Vec<DepartmentLink>,
    pub desktop: DesktopNavigator,
    pub mobile: MobileNavigator,
    pub nav_cursor: usize,
    pub hit_regions: Vec<(Rect, HitTarget)>,
    pub departments: Vec<DepartmentRow>,
    pub selected_index: usize,
    pub department_list_state: ListState,
    pub pending_delete: Option<String>,
    pub page: Option<DepartmentPage>,
    pub page_missing: Option<String>,
    pub page_scroll: u16,
    pub wizard: Option<DepartmentWizard>,
    pub wizard_cursor: usize,
    pub command_input: String,
    pub command_cursor: usize,
    pub command_history: Vec<String>,
    pub command_history_index: Option<usize>,
    pub log_messages: Vec<String>,
    pub cmd_tx: mpsc::UnboundedSender<AppCommand>,
    pub evt_rx: Option<mpsc::UnboundedReceiver<AppEvent>>,
}

impl App {
    pub fn new(
        session_info: Vec<String>,
        layout: NavLayout,
        cmd_tx: mpsc::UnboundedSender<AppCommand>,
        evt_rx: mpsc::UnboundedReceiver<AppEvent>,
    ) -> App {
        let mut log_messages = vec!["campusdesk started".to_string()];
        log_messages.extend(session_info);

        App {
            view_mode: ViewMode::Navigation,
            input_mode: InputMode::Normal,
            focus_area: FocusArea::MainView,
            menu_selected_index: 0,
            layout,
            programs: Vec::new(),
            links: Vec::new(),
            desktop: DesktopNavigator::new(),
            mobile: MobileNavigator::new(),
            nav_cursor: 0,
            hit_regions: Vec::new(),
            departments: Vec::new(),
            selected_index: 0,
            department_list_state: {
                let mut s = ListState::default();
                s.select(Some(0));
                s
            },
            pending_delete: None,
            page: None,
            page_missing: None,
            page_scroll: 0,
            wizard: None,
            wizard_cursor: 0,
            command_input: String::new(),
            command_cursor: 0,
            command_history: Vec::new(),
            command_history_index: None,
            log_messages,
            cmd_tx,
            evt_rx: Some(evt_rx),
        }
    }

    pub fn add_log(&mut self, msg: String) {
        self.log_messages.push(msg);
    }

    pub fn push_toast(&mut self, toast: &Toast) {
        let mark = match toast.kind {
            ToastKind::Success => "✓",
            ToastKind::Error => "✗",
        };
        self.add_log(format!("{} {}: {}", mark, toast.title, toast.description));
    }

    fn send(&self, cmd: AppCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Message(msg) => self.add_log(msg),
            AppEvent::Error(msg) => self.add_log(format!("✗ {}", msg)),
            AppEvent::Toast(toast) => self.push_toast(&toast),
            AppEvent::Navigation { programs, links } => {
                self.programs = programs;
                self.links = links;
                self.desktop.unmount();
                self.mobile.set_cursor(self.mobile.cursor(), &self.programs);
                self.nav_cursor = 0;
            }
            AppEvent::Departments(rows) => {
                self.departments = rows;
                self.clamp_selection();
            }
            AppEvent::Page(page) => {
                self.page = Some(*page);
                self.page_missing = None;
                self.page_scroll = 0;
            }
            AppEvent::PageNotFound(slug) => {
                self.page = None;
                self.page_missing = Some(slug);
            }
            AppEvent::Wizard(wizard) => {
                let step_changed = self
                    .wizard
                    .as_ref()
                    .map(|w| w.step() != wizard.step())
                    .unwrap_or(true);
                if step_changed {
                    self.wizard_cursor = 0;
                }
                let len = wizard_rows(&wizard).len();
                self.wizard_cursor = self.wizard_cursor.min(len.saturating_sub(1));
                self.wizard = Some(*wizard);
            }
            AppEvent::WizardClosed => {
                self.wizard = None;
                if matches!(self.input_mode, InputMode::Prompt(_)) {
                    self.input_mode = InputMode::Normal;
                }
                if self.view_mode == ViewMode::Wizard {
                    self.switch_view(ViewMode::Departments);
                }
            }
        }
    }

    /// 推进悬停定时器，返回是否需要重绘
    pub fn tick(&mut self, now: Instant) -> bool {
        self.desktop.tick(now)
    }

    pub fn clamp_selection(&mut self) {
        if self.selected_index >= self.departments.len() {
            self.selected_index = self.departments.len().saturating_sub(1);
        }
        self.department_list_state.select(Some(self.selected_index));
    }

    /// 离开导航页即卸载悬停状态；重新进入时重新拉取层级
    fn switch_view(&mut self, view: ViewMode) {
        let leaving = self.view_mode == ViewMode::Navigation && view != ViewMode::Navigation;
        let entering = self.view_mode != ViewMode::Navigation && view == ViewMode::Navigation;
        if leaving {
            self.desktop.unmount();
            self.hit_regions.clear();
        }
        self.view_mode = view;
        if let Some(i) = MENU_ITEMS.iter().position(|(_, v)| *v == view) {
            self.menu_selected_index = i;
        }
        if entering {
            self.send(AppCommand::LoadNavigation);
        }
    }

    pub fn set_layout(&mut self, layout: NavLayout) {
        self.desktop.unmount();
        self.mobile.unmount();
        self.layout = layout;
        self.add_log(format!("Navigation layout: {}", layout.as_str()));
    }

    pub fn open_href(&mut self, href: &str) {
        let slug = slug_from(href);
        self.page = None;
        self.page_missing = None;
        self.switch_view(ViewMode::DepartmentPage);
        self.send(AppCommand::OpenDepartment { slug });
    }

    /// 执行一条已解析的命令；返回 true 表示退出
    pub fn dispatch_command(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::Quit => return true,
            AppCommand::SetLayout(layout) => self.set_layout(layout),
            AppCommand::Help => self.add_log(HELP_TEXT.to_string()),
            AppCommand::OpenDepartment { slug } => self.open_href(&slug),
            AppCommand::LoadNavigation => {
                if self.view_mode == ViewMode::Navigation {
                    self.send(AppCommand::LoadNavigation);
                } else {
                    self.switch_view(ViewMode::Navigation);
                }
            }
            AppCommand::LoadDepartments => {
                self.switch_view(ViewMode::Departments);
                self.send(AppCommand::LoadDepartments);
            }
            AppCommand::NewDepartment | AppCommand::EditDepartment { .. } => {
                self.wizard = None;
                self.wizard_cursor = 0;
                self.switch_view(ViewMode::Wizard);
                self.send(cmd);
            }
            AppCommand::Unknown(msg) if msg.is_empty() => {}
            AppCommand::Unknown(msg) => self.add_log(format!("✗ {}", msg)),
            other => self.send(other),
        }
        false
    }

    fn byte_index(&self) -> usize {
        self.command_input
            .char_indices()
            .nth(self.command_cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.command_input.len())
    }

    fn reset_input(&mut self) {
        self.command_input.clear();
        self.command_cursor = 0;
        self.input_mode = InputMode::Normal;
    }

    fn start_prompt(&mut self, target: PromptTarget, prefill: &str) {
        self.command_input = prefill.to_string();
        self.command_cursor = self.command_input.chars().count();
        self.input_mode = InputMode::Prompt(target);
    }

    /// 输入行共用的编辑键；返回 true 表示已处理
    fn edit_input(&mut self, key: KeyCode) -> bool {
        match key {
            KeyCode::Backspace => {
                if self.command_cursor > 0 {
                    self.command_cursor -= 1;
                    let idx = self.byte_index();
                    self.command_input.remove(idx);
                }
            }
            KeyCode::Delete => {
                if self.command_cursor < self.command_input.chars().count() {
                    let idx = self.byte_index();
                    self.command_input.remove(idx);
                }
            }
            KeyCode::Left => self.command_cursor = self.command_cursor.saturating_sub(1),
            KeyCode::Right => {
                if self.command_cursor < self.command_input.chars().count() {
                    self.command_cursor += 1;
                }
            }
            KeyCode::Home => self.command_cursor = 0,
            KeyCode::End => self.command_cursor = self.command_input.chars().count(),
            KeyCode::Char(c) => {
                let idx = self.byte_index();
                self.command_input.insert(idx, c);
                self.command_cursor += 1;
            }
            _ => return false,
        }
        true
    }

    fn commit_prompt(&mut self, target: PromptTarget) {
        let value = self.command_input.clone();
        self.reset_input();
        let actions = match target {
            PromptTarget::Field(field) => vec![WizardAction::SetField(field, value)],
            PromptTarget::Chip(field) => vec![
                WizardAction::SetChipPending(field, value),
                WizardAction::AddChip(field),
            ],
            PromptTarget::NewProgram => vec![
                WizardAction::SetNewProgramName(value),
                WizardAction::CreateProgram,
            ],
            PromptTarget::NewTrade => vec![
                WizardAction::SetNewTradeName(value),
                WizardAction::CreateTrade,
            ],
            PromptTarget::HeroPath => {
                let path = value.trim();
                if !path.is_empty() {
                    self.send(AppCommand::AttachHero(PathBuf::from(path)));
                }
                return;
            }
            PromptTarget::GalleryPaths => {
                let paths: Vec<PathBuf> = value.split_whitespace().map(PathBuf::from).collect();
                if !paths.is_empty() {
                    self.send(AppCommand::QueueGallery(paths));
                }
                return;
            }
        };
        for action in actions {
            self.send(AppCommand::Wizard(action));
        }
    }

    pub fn handle_key_event(&mut self, key: KeyCode) -> bool {
        if let InputMode::Prompt(target) = self.input_mode.clone() {
            match key {
                KeyCode::Enter => self.commit_prompt(target),
                KeyCode::Esc => self.reset_input(),
                other => {
                    self.edit_input(other);
                }
            }
            return false;
        }

        if self.input_mode == InputMode::Command {
            match key {
                KeyCode::Enter => {
                    let cmd_owned = self.command_input.trim().to_string();
                    self.reset_input();
                    if cmd_owned.is_empty() {
                        return false;
                    }
                    self.command_history.push(cmd_owned.clone());
                    self.command_history_index = None;
                    let cmd = AppCommand::from_str(&cmd_owned)
                        .unwrap_or(AppCommand::Unknown(cmd_owned));
                    return self.dispatch_command(cmd);
                }
                KeyCode::Esc => self.reset_input(),
                KeyCode::Up => {
                    if self.command_history.is_empty() {
                        return false;
                    }
                    let next = match self.command_history_index {
                        None => self.command_history.len() - 1,
                        Some(i) => i.saturating_sub(1),
                    };
                    self.command_history_index = Some(next);
                    self.command_input = self.command_history[next].clone();
                    self.command_cursor = self.command_input.chars().count();
                }
                KeyCode::Down => {
                    let Some(i) = self.command_history_index else {
                        return false;
                    };
                    if i + 1 >= self.command_history.len() {
                        self.command_history_index = None;
                        self.command_input.clear();
                        self.command_cursor = 0;
                    } else {
                        self.command_history_index = Some(i + 1);
                        self.command_input = self.command_history[i + 1].clone();
                        self.command_cursor = self.command_input.chars().count();
                    }
                }
                other => {
                    self.edit_input(other);
                }
            }
            return false;
        }

        // 正常模式
        match key {
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Command;
                self.command_input.clear();
                self.command_cursor = 0;
                false
            }
            KeyCode::Char('q') if self.view_mode != ViewMode::Wizard => true,
            KeyCode::Tab => {
                self.focus_area = match self.focus_area {
                    FocusArea::Menu => FocusArea::MainView,
                    FocusArea::MainView => FocusArea::Menu,
                };
                false
            }
            _ if self.focus_area == FocusArea::Menu => {
                self.handle_menu_key(key);
                false
            }
            _ => {
                match self.view_mode {
                    ViewMode::Navigation => self.handle_navigation_key(key),
                    ViewMode::Departments => self.handle_departments_key(key),
                    ViewMode::DepartmentPage => self.handle_page_key(key),
                    ViewMode::Wizard => self.handle_wizard_key(key),
                }
                false
            }
        }
    }

    fn handle_menu_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.menu_selected_index = self.menu_selected_index.saturating_sub(1),
            KeyCode::Down => {
                if self.menu_selected_index + 1 < MENU_ITEMS.len() {
                    self.menu_selected_index += 1;
                }
            }
            KeyCode::Right => self.focus_area = FocusArea::MainView,
            KeyCode::Enter => {
                let (_, view) = MENU_ITEMS[self.menu_selected_index];
                match view {
                    ViewMode::Departments => {
                        self.dispatch_command(AppCommand::LoadDepartments);
                    }
                    ViewMode::Wizard if self.view_mode != ViewMode::Wizard => {
                        self.dispatch_command(AppCommand::NewDepartment);
                    }
                    other => self.switch_view(other),
                }
                self.focus_area = FocusArea::MainView;
            }
            _ => {}
        }
    }

    fn handle_navigation_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') => {
                self.send(AppCommand::LoadNavigation);
            }
            KeyCode::Char('l') => self.set_layout(self.layout.toggled()),
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            _ if self.programs.is_empty() => match key {
                KeyCode::Up => self.nav_cursor = self.nav_cursor.saturating_sub(1),
                KeyCode::Down => {
                    if self.nav_cursor + 1 < self.links.len() {
                        self.nav_cursor += 1;
                    }
                }
                KeyCode::Enter => {
                    if let Some(href) = self.links.get(self.nav_cursor).map(DepartmentLink::href) {
                        self.open_href(&href);
                    }
                }
                _ => {}
            },
            _ => match self.layout {
                NavLayout::Mobile => match key {
                    KeyCode::Up => self.mobile.move_cursor(-1, &self.programs),
                    KeyCode::Down => self.mobile.move_cursor(1, &self.programs),
                    KeyCode::Enter | KeyCode::Char(' ') => {
                        if let Some(href) = self.mobile.activate(&self.programs) {
                            self.open_href(&href);
                        }
                    }
                    _ => {}
                },
                // 桌面布局以鼠标为主，上下键模拟指针停在某个 program 上
                NavLayout::Desktop => {
                    let len = self.programs.len();
                    match key {
                        KeyCode::Up => self.nav_cursor = self.nav_cursor.saturating_sub(1),
                        KeyCode::Down => self.nav_cursor = (self.nav_cursor + 1).min(len - 1),
                        _ => return,
                    }
                    let id = self.programs[self.nav_cursor].id.clone();
                    self.desktop
                        .pointer_moved(Some(HoverTarget::program(id)), Instant::now());
                }
            },
        }
    }

    fn selected_department(&self) -> Option<&DepartmentRow> {
        self.departments.get(self.selected_index)
    }

    fn handle_departments_key(&mut self, key: KeyCode) {
        if let Some(code) = self.pending_delete.take() {
            if key == KeyCode::Char('y') {
                self.send(AppCommand::DeleteDepartment { code });
            } else {
                self.add_log("Delete cancelled".to_string());
            }
            return;
        }
        match key {
            KeyCode::Up => {
                self.selected_index = self.selected_index.saturating_sub(1);
                self.clamp_selection();
            }
            KeyCode::Down => {
                self.selected_index += 1;
                self.clamp_selection();
            }
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            KeyCode::Char('r') => self.send(AppCommand::LoadDepartments),
            KeyCode::Char('n') => {
                self.dispatch_command(AppCommand::NewDepartment);
            }
            KeyCode::Enter => {
                if let Some(href) = self.selected_department().map(|d| crate::api::department_href(&d.code)) {
                    self.open_href(&href);
                }
            }
            KeyCode::Char('e') => {
                if let Some(code) = self.selected_department().map(|d| d.code.clone()) {
                    self.dispatch_command(AppCommand::EditDepartment { code });
                }
            }
            KeyCode::Char('d') => {
                if let Some((name, code)) = self
                    .selected_department()
                    .map(|d| (d.name.clone(), d.code.clone()))
                {
                    self.add_log(format!(
                        "Delete {} ({})? Press y to confirm, any other key to cancel",
                        name, code
                    ));
                    self.pending_delete = Some(code);
                }
            }
            _ => {}
        }
    }

    fn handle_page_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up => self.page_scroll = self.page_scroll.saturating_sub(1),
            KeyCode::Down => self.page_scroll = self.page_scroll.saturating_add(1),
            KeyCode::Esc | KeyCode::Char('x') => self.switch_view(ViewMode::Navigation),
            KeyCode::Left => self.focus_area = FocusArea::Menu,
            KeyCode::Char('e') => {
                if let Some(code) = self.page.as_ref().map(|p| p.department.code.clone()) {
                    self.dispatch_command(AppCommand::EditDepartment { code });
                }
            }
            _ => {}
        }
    }

    fn handle_wizard_key(&mut self, key: KeyCode) {
        let Some(wizard) = &self.wizard else {
            if key == KeyCode::Esc {
                self.switch_view(ViewMode::Navigation);
            }
            return;
        };
        let rows = wizard_rows(wizard);
        let current = rows.get(self.wizard_cursor).cloned();
        match key {
            KeyCode::Up => self.wizard_cursor = self.wizard_cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.wizard_cursor + 1 < rows.len() {
                    self.wizard_cursor += 1;
                }
            }
            KeyCode::Esc => self.send(AppCommand::Wizard(WizardAction::Back)),
            KeyCode::Enter => {
                if let Some(row) = current {
                    self.activate_wizard_row(row);
                }
            }
            KeyCode::Char(' ') if current == Some(WizardRow::Active) => {
                self.activate_wizard_row(WizardRow::Active);
            }
            KeyCode::Char('x') if current == Some(WizardRow::Hero) => {
                self.send(AppCommand::Wizard(WizardAction::ToggleHeroRemoval));
            }
            KeyCode::Delete | KeyCode::Backspace => match current {
                Some(WizardRow::Chips(field)) => {
                    let last = wizard.form.chips(field).tags.iter().last().map(str::to_string);
                    if let Some(value) = last {
                        self.send(AppCommand::Wizard(WizardAction::RemoveChip(field, value)));
                    }
                }
                Some(WizardRow::Gallery) => {
                    self.send(AppCommand::Wizard(WizardAction::ClearGallery));
                }
                _ => {}
            },
            _ => {}
        }
    }

    fn activate_wizard_row(&mut self, row: WizardRow) {
        let Some(wizard) = &self.wizard else {
            return;
        };
        match row {
            WizardRow::Program { id, .. } => {
                self.send(AppCommand::Wizard(WizardAction::SelectProgram(id)));
            }
            WizardRow::CreateProgram => {
                let prefill = wizard.new_program_name.clone();
                self.start_prompt(PromptTarget::NewProgram, &prefill);
            }
            WizardRow::Trade { id, .. } => {
                self.send(AppCommand::Wizard(WizardAction::SelectTrade(id)));
            }
            WizardRow::DirectBranch => self.send(AppCommand::Wizard(WizardAction::DirectBranch)),
            WizardRow::CreateTrade => {
                let prefill = wizard.new_trade_name.clone();
                self.start_prompt(PromptTarget::NewTrade, &prefill);
            }
            WizardRow::Field(field) => {
                let prefill = wizard.form.text(field).to_string();
                self.start_prompt(PromptTarget::Field(field), &prefill);
            }
            WizardRow::Active => {
                let active = !wizard.form.is_active;
                self.send(AppCommand::Wizard(WizardAction::SetActive(active)));
            }
            WizardRow::Chips(field) => self.start_prompt(PromptTarget::Chip(field), ""),
            WizardRow::Hero => self.start_prompt(PromptTarget::HeroPath, ""),
            WizardRow::Gallery => self.start_prompt(PromptTarget::GalleryPaths, ""),
            WizardRow::Submit => self.send(AppCommand::Wizard(WizardAction::Submit)),
        }
    }

    pub fn hit_at(&self, column: u16, row: u16) -> Option<&HitTarget> {
        self.hit_regions
            .iter()
            .rev()
            .find(|(rect, _)| rect_contains(rect, column, row))
            .map(|(_, target)| target)
    }

    pub fn handle_mouse(&mut self, event: MouseEvent, now: Instant) {
        if self.view_mode != ViewMode::Navigation {
            return;
        }
        let target = self.hit_at(event.column, event.row).cloned();
        match event.kind {
            MouseEventKind::Moved | MouseEventKind::Drag(_) => {
                if self.layout == NavLayout::Desktop {
                    let hover = target.as_ref().and_then(HitTarget::hover);
                    self.desktop.pointer_moved(hover, now);
                }
            }
            MouseEventKind::Down(MouseButton::Left) => match target {
                Some(HitTarget::MobileRow(index)) => {
                    self.mobile.set_cursor(index, &self.programs);
                    if let Some(href) = self.mobile.activate(&self.programs) {
                        self.open_href(&href);
                    }
                }
                Some(hit) => {
                    if let Some(href) = hit.href() {
                        let href = href.to_string();
                        self.open_href(&href);
                    } else if let Some(hover) = hit.hover() {
                        // 触屏式点击：直接当作悬停
                        self.desktop.pointer_moved(Some(hover), now);
                    }
                }
                None => {}
            },
            _ => {}
        }
    }
}
