use super::{ProgramNode, TradeNode};
use std::time::{Duration, Instant};

/// 鼠标离开到收起二级/三级菜单之间的延迟
pub const CLOSE_DELAY: Duration = Duration::from_millis(200);

/// 单个层级的收起定时器；新的 start 直接覆盖旧的截止时间
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CloseTimer {
    deadline: Option<Instant>,
}

impl CloseTimer {
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + CLOSE_DELAY);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// 到期时返回 true 并清空，只触发一次
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// 指针所在的位置：某个 program 行（或它的弹出面板），可能还落在其中某个 trade 上
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverTarget {
    pub program_id: String,
    pub trade_id: Option<String>,
}

impl HoverTarget {
    pub fn program(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
            trade_id: None,
        }
    }

    pub fn trade(program_id: impl Into<String>, trade_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
            trade_id: Some(trade_id.into()),
        }
    }
}

/// 桌面端悬停弹出菜单的状态
#[derive(Debug, Clone, Default)]
pub struct DesktopNavigator {
    hovered_program: Option<String>,
    hovered_trade: Option<String>,
    program_timer: CloseTimer,
    trade_timer: CloseTimer,
    pointer: Option<HoverTarget>,
}

impl DesktopNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_program(&self) -> Option<&str> {
        self.hovered_program.as_deref()
    }

    pub fn hovered_trade(&self) -> Option<&str> {
        self.hovered_trade.as_deref()
    }

    pub fn program_enter(&mut self, program_id: &str) {
        self.program_timer.cancel();
        self.hovered_program = Some(program_id.to_string());
    }

    pub fn program_leave(&mut self, now: Instant) {
        self.program_timer.start(now);
    }

    pub fn trade_enter(&mut self, trade_id: &str) {
        self.trade_timer.cancel();
        self.hovered_trade = Some(trade_id.to_string());
    }

    pub fn trade_leave(&mut self, now: Instant) {
        self.trade_timer.start(now);
    }

    /// 推进定时器，返回可见状态是否变化
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.program_timer.fire(now) {
            changed = self.hovered_program.is_some() || self.hovered_trade.is_some();
            self.hovered_program = None;
            self.hovered_trade = None;
        }
        if self.trade_timer.fire(now) {
            changed |= self.hovered_trade.is_some();
            self.hovered_trade = None;
        }
        changed
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.program_timer.deadline(), self.trade_timer.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// 把一次指针移动翻译成 leave/enter 事件
    ///
    /// 面板嵌套在打开它的行内，所以从 program 行移到它的 trade 上不算离开 program。
    /// 先内层 leave、再外层 leave，然后外层 enter、内层 enter。
    pub fn pointer_moved(&mut self, target: Option<HoverTarget>, now: Instant) {
        if self.pointer == target {
            return;
        }
        let prev = self.pointer.take();
        let prev_program = prev.as_ref().map(|t| t.program_id.as_str());
        let next_program = target.as_ref().map(|t| t.program_id.as_str());
        let prev_trade = prev.as_ref().and_then(|t| t.trade_id.as_deref());
        let next_trade = target.as_ref().and_then(|t| t.trade_id.as_deref());
        let program_changed = prev_program != next_program;
        let trade_changed = program_changed || prev_trade != next_trade;

        if trade_changed && prev_trade.is_some() {
            self.trade_leave(now);
        }
        if program_changed && prev_program.is_some() {
            self.program_leave(now);
        }
        if program_changed {
            if let Some(id) = next_program {
                self.program_enter(id);
            }
        }
        if trade_changed {
            if let Some(id) = next_trade {
                self.trade_enter(id);
            }
        }
        self.pointer = target;
    }

    /// 菜单卸载：取消所有定时器并清空状态
    pub fn unmount(&mut self) {
        *self = Self::default();
    }

    /// 当前展开的二级面板（无子项的 program 不弹出）
    pub fn open_program<'a>(&self, programs: &'a [ProgramNode]) -> Option<&'a ProgramNode> {
        let id = self.hovered_program.as_deref()?;
        programs
            .iter()
            .find(|p| p.id == id)
            .filter(|p| p.has_children())
    }

    pub fn open_trade<'a>(&self, programs: &'a [ProgramNode]) -> Option<&'a TradeNode> {
        let program = self.open_program(programs)?;
        let id = self.hovered_trade.as_deref()?;
        program.trade(id).filter(|t| t.has_children())
    }
}
