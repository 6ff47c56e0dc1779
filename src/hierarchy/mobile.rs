use super::{DepartmentLink, ProgramNode};

/// 折叠菜单展开后的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MobileRow {
    Program {
        id: String,
        name: String,
        expanded: bool,
    },
    Trade {
        id: String,
        name: String,
        expanded: bool,
    },
    /// depth: 1 = program 直属，2 = trade 下
    Department { link: DepartmentLink, depth: u8 },
}

impl MobileRow {
    pub fn depth(&self) -> u8 {
        match self {
            MobileRow::Program { .. } => 0,
            MobileRow::Trade { .. } => 1,
            MobileRow::Department { depth, .. } => *depth,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            MobileRow::Program { name, .. } | MobileRow::Trade { name, .. } => name,
            MobileRow::Department { link, .. } => &link.name,
        }
    }
}

/// 移动端手风琴菜单：点一下展开，再点收起，没有定时器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MobileNavigator {
    expanded_program: Option<String>,
    expanded_trade: Option<String>,
    cursor: usize,
}

impl MobileNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanded_program(&self) -> Option<&str> {
        self.expanded_program.as_deref()
    }

    pub fn expanded_trade(&self) -> Option<&str> {
        self.expanded_trade.as_deref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// 切换 program 时总是收起已展开的 trade
    pub fn toggle_program(&mut self, program_id: &str) {
        if self.expanded_program.as_deref() == Some(program_id) {
            self.expanded_program = None;
        } else {
            self.expanded_program = Some(program_id.to_string());
        }
        self.expanded_trade = None;
    }

    pub fn toggle_trade(&mut self, trade_id: &str) {
        if self.expanded_trade.as_deref() == Some(trade_id) {
            self.expanded_trade = None;
        } else {
            self.expanded_trade = Some(trade_id.to_string());
        }
    }

    /// 当前可见的行：trade 在前，直属部门在后
    pub fn rows(&self, programs: &[ProgramNode]) -> Vec<MobileRow> {
        let mut rows = Vec::new();
        for program in programs {
            let expanded = self.expanded_program.as_deref() == Some(program.id.as_str());
            rows.push(MobileRow::Program {
                id: program.id.clone(),
                name: program.name.clone(),
                expanded,
            });
            if !expanded {
                continue;
            }
            for trade in &program.trades {
                let trade_open = self.expanded_trade.as_deref() == Some(trade.id.as_str());
                rows.push(MobileRow::Trade {
                    id: trade.id.clone(),
                    name: trade.name.clone(),
                    expanded: trade_open,
                });
                if trade_open {
                    rows.extend(trade.departments.iter().map(|d| MobileRow::Department {
                        link: d.clone(),
                        depth: 2,
                    }));
                }
            }
            rows.extend(program.direct_branches.iter().map(|d| MobileRow::Department {
                link: d.clone(),
                depth: 1,
            }));
        }
        rows
    }

    pub fn move_cursor(&mut self, delta: isize, programs: &[ProgramNode]) {
        let len = self.rows(programs).len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    pub fn set_cursor(&mut self, index: usize, programs: &[ProgramNode]) {
        let len = self.rows(programs).len();
        self.cursor = index.min(len.saturating_sub(1));
    }

    /// 激活光标所在行：program/trade 行切换展开，部门行返回页面地址
    pub fn activate(&mut self, programs: &[ProgramNode]) -> Option<String> {
        let row = self.rows(programs).into_iter().nth(self.cursor)?;
        match row {
            MobileRow::Program { id, .. } => {
                self.toggle_program(&id);
                self.set_cursor(self.cursor, programs);
                None
            }
            MobileRow::Trade { id, .. } => {
                self.toggle_trade(&id);
                None
            }
            MobileRow::Department { link, .. } => Some(link.href()),
        }
    }

    pub fn unmount(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::fixtures::sample;
    use pretty_assertions::assert_eq;

    fn labels(rows: &[MobileRow]) -> Vec<&str> {
        rows.iter().map(MobileRow::label).collect()
    }

    #[test]
    fn toggling_another_program_collapses_trade() {
        let mut nav = MobileNavigator::new();
        nav.toggle_program("eng");
        nav.toggle_trade("btech");
        assert_eq!(nav.expanded_trade(), Some("btech"));

        nav.toggle_program("sci");
        assert_eq!(nav.expanded_program(), Some("sci"));
        assert_eq!(nav.expanded_trade(), None);

        nav.toggle_program("sci");
        assert_eq!(nav.expanded_program(), None);
    }

    #[test]
    fn toggle_trade_only_touches_trade() {
        let mut nav = MobileNavigator::new();
        nav.toggle_program("eng");
        nav.toggle_trade("btech");
        nav.toggle_trade("btech");
        assert_eq!(nav.expanded_program(), Some("eng"));
        assert_eq!(nav.expanded_trade(), None);
    }

    #[test]
    fn rows_follow_expansion() {
        let tree = sample();
        let mut nav = MobileNavigator::new();
        assert_eq!(labels(&nav.rows(&tree)), vec!["Engineering", "Sciences"]);

        nav.toggle_program("eng");
        nav.toggle_trade("btech");
        let rows = nav.rows(&tree);
        assert_eq!(
            labels(&rows),
            vec![
                "Engineering",
                "B.Tech",
                "CSE Department",
                "ME Department",
                "B.Arch",
                "MBA Department",
                "Sciences",
            ]
        );
        assert_eq!(rows[2].depth(), 2);
        assert_eq!(rows[5].depth(), 1);
    }

    #[test]
    fn activate_walks_down_to_department() {
        let tree = sample();
        let mut nav = MobileNavigator::new();

        assert_eq!(nav.activate(&tree), None);
        nav.move_cursor(1, &tree);
        assert_eq!(nav.activate(&tree), None);
        nav.move_cursor(1, &tree);
        assert_eq!(nav.activate(&tree), Some("/departments/cse".to_string()));

        nav.move_cursor(100, &tree);
        assert_eq!(nav.cursor(), 6);
        nav.move_cursor(-100, &tree);
        assert_eq!(nav.cursor(), 0);
    }
}
