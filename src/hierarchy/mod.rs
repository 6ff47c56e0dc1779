pub mod desktop;
pub mod mobile;

pub use desktop::{DesktopNavigator, HoverTarget, CLOSE_DELAY};
pub use mobile::{MobileNavigator, MobileRow};

use crate::api::{department_href, ApiError, CollegeApi, Department, Program, Trade};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentLink {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
}

impl DepartmentLink {
    pub fn href(&self) -> String {
        department_href(&self.code)
    }
}

impl From<&Department> for DepartmentLink {
    fn from(d: &Department) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            code: d.code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub is_predefined: bool,
    #[serde(default)]
    pub departments: Vec<DepartmentLink>,
}

impl TradeNode {
    pub fn has_children(&self) -> bool {
        !self.departments.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramNode {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub is_predefined: bool,
    #[serde(default)]
    pub trades: Vec<TradeNode>,
    #[serde(default)]
    pub direct_branches: Vec<DepartmentLink>,
}

impl ProgramNode {
    /// 没有 trade 也没有直属部门时不显示箭头、不弹出二级菜单
    pub fn has_children(&self) -> bool {
        !self.trades.is_empty() || !self.direct_branches.is_empty()
    }

    pub fn trade(&self, trade_id: &str) -> Option<&TradeNode> {
        self.trades.iter().find(|t| t.id == trade_id)
    }
}

/// 把扁平记录拼成三级树；保持输入顺序，未激活的记录被丢弃
pub fn assemble(
    programs: Vec<Program>,
    trades: Vec<Trade>,
    departments: Vec<Department>,
) -> Vec<ProgramNode> {
    let mut nodes: Vec<ProgramNode> = programs
        .into_iter()
        .filter(|p| p.is_active)
        .map(|p| ProgramNode {
            id: p.id,
            name: p.name,
            code: p.code,
            is_predefined: p.is_predefined,
            trades: Vec::new(),
            direct_branches: Vec::new(),
        })
        .collect();
    let program_index: HashMap<String, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id.clone(), i))
        .collect();

    // trade id -> (program 下标, trade 下标)
    let mut trade_index: HashMap<String, (usize, usize)> = HashMap::new();
    for trade in trades.into_iter().filter(|t| t.is_active) {
        let Some(&pi) = program_index.get(&trade.program_id) else {
            debug!("trade {} 的 program {} 不存在，跳过", trade.id, trade.program_id);
            continue;
        };
        let ti = nodes[pi].trades.len();
        trade_index.insert(trade.id.clone(), (pi, ti));
        nodes[pi].trades.push(TradeNode {
            id: trade.id,
            name: trade.name,
            code: trade.code,
            is_predefined: trade.is_predefined,
            departments: Vec::new(),
        });
    }

    for dept in departments.iter().filter(|d| d.is_active) {
        let link = DepartmentLink::from(dept);
        match (&dept.trade_id, dept.is_direct_branch) {
            (Some(trade_id), false) => match trade_index.get(trade_id) {
                Some(&(pi, ti)) if nodes[pi].id == dept.program_id => {
                    nodes[pi].trades[ti].departments.push(link)
                }
                _ => debug!("部门 {} 的 trade {} 不在树中，跳过", dept.code, trade_id),
            },
            (None, true) => match program_index.get(&dept.program_id) {
                Some(&pi) => nodes[pi].direct_branches.push(link),
                None => debug!("部门 {} 的 program 不存在，跳过", dept.code),
            },
            _ => warn!(
                "部门 {} 同时（或都没有）挂在 trade 与 direct branch 上，跳过",
                dept.code
            ),
        }
    }

    nodes
}

/// 菜单挂载时整体拉取的层级数据，卸载即丢弃
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierarchyStore {
    programs: Vec<ProgramNode>,
}

impl HierarchyStore {
    pub fn new(programs: Vec<ProgramNode>) -> Self {
        Self { programs }
    }

    /// 拉取失败时静默降级为空菜单
    pub async fn load(api: &dyn CollegeApi) -> Self {
        match api.program_hierarchy().await {
            Ok(programs) => Self::new(programs),
            Err(e) => {
                warn!("加载院系层级失败: {}", e);
                Self::default()
            }
        }
    }

    pub fn programs(&self) -> &[ProgramNode] {
        &self.programs
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn program(&self, id: &str) -> Option<&ProgramNode> {
        self.programs.iter().find(|p| p.id == id)
    }

    pub fn department_count(&self) -> usize {
        self.programs
            .iter()
            .map(|p| {
                p.direct_branches.len()
                    + p.trades.iter().map(|t| t.departments.len()).sum::<usize>()
            })
            .sum()
    }
}

/// 层级为空时导航栏的兜底链接
pub fn fallback_department_links() -> Vec<DepartmentLink> {
    vec![
        DepartmentLink {
            id: "cse".to_string(),
            name: "Computer Science & Engineering".to_string(),
            code: "CSE".to_string(),
        },
        DepartmentLink {
            id: "it".to_string(),
            name: "Information Technology".to_string(),
            code: "IT".to_string(),
        },
    ]
}

/// 扁平部门列表转链接；列表为空或请求失败时返回兜底的两项
pub fn department_links(result: Result<Vec<Department>, ApiError>) -> Vec<DepartmentLink> {
    let departments = match result {
        Ok(d) => d,
        Err(e) => {
            warn!("加载部门列表失败，使用默认链接: {}", e);
            return fallback_department_links();
        }
    };
    let links: Vec<DepartmentLink> = departments
        .iter()
        .filter(|d| !d.code.trim().is_empty() || !d.id.trim().is_empty())
        .map(|d| {
            let mut link = DepartmentLink::from(d);
            if link.code.trim().is_empty() {
                link.code = d.id.clone();
            }
            if link.name.trim().is_empty() {
                link.name = "Unnamed Department".to_string();
            }
            link
        })
        .collect();
    if links.is_empty() {
        warn!("没有可用的部门，使用默认链接");
        fallback_department_links()
    } else {
        links
    }
}
