use crate::config::NavLayout;
use crate::wizard::WizardAction;
use std::path::PathBuf;
use std::str::FromStr;

pub const HELP_TEXT: &str = "Commands: nav [reload] | layout desktop|mobile | open <code> | departments | new | edit <code> | delete <code> | help | quit";

#[derive(Debug, Clone)]
pub enum AppCommand {
    LoadNavigation,
    SetLayout(NavLayout),
    OpenDepartment { slug: String },
    LoadDepartments,
    NewDepartment,
    EditDepartment { code: String },
    DeleteDepartment { code: String },
    /// 以下由向导界面发出，不走命令行
    Wizard(WizardAction),
    AttachHero(PathBuf),
    QueueGallery(Vec<PathBuf>),
    Help,
    Quit,
    Unknown(String),
}

/// 接受 `cse`、`CSE` 或 `/departments/cse`
pub fn slug_from(raw: &str) -> String {
    let t = raw.trim().trim_end_matches('/');
    let t = t.strip_prefix("/departments/").unwrap_or(t);
    t.to_lowercase()
}

impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix('/').unwrap_or(s);
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return Ok(AppCommand::Unknown("".to_string()));
        }

        match parts[0] {
            "nav" | "menu" => match parts.get(1).copied() {
                None | Some("reload") => Ok(AppCommand::LoadNavigation),
                Some(other) => Ok(AppCommand::Unknown(format!(
                    "unknown nav subcommand: {} (usage: nav [reload])",
                    other
                ))),
            },
            "layout" => match parts.get(1).map(|s| s.parse::<NavLayout>()) {
                Some(Ok(layout)) => Ok(AppCommand::SetLayout(layout)),
                _ => Ok(AppCommand::Unknown(
                    "usage: layout desktop|mobile".to_string(),
                )),
            },
            "open" => match parts.get(1) {
                Some(code) => Ok(AppCommand::OpenDepartment {
                    slug: slug_from(code),
                }),
                None => Ok(AppCommand::Unknown("usage: open <code>".to_string())),
            },
            "departments" | "depts" => Ok(AppCommand::LoadDepartments),
            "new" => Ok(AppCommand::NewDepartment),
            "edit" => match parts.get(1) {
                Some(code) => Ok(AppCommand::EditDepartment {
                    code: code.to_uppercase(),
                }),
                None => Ok(AppCommand::Unknown("usage: edit <code>".to_string())),
            },
            "delete" | "rm" => match parts.get(1) {
                Some(code) => Ok(AppCommand::DeleteDepartment {
                    code: code.to_uppercase(),
                }),
                None => Ok(AppCommand::Unknown("usage: delete <code>".to_string())),
            },
            "help" | "h" => Ok(AppCommand::Help),
            "quit" | "q" | "exit" => Ok(AppCommand::Quit),
            _ => Ok(AppCommand::Unknown(format!("unknown command: {}", parts[0]))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> AppCommand {
        s.parse().unwrap()
    }

    #[test]
    fn navigation_commands() {
        assert!(matches!(parse("nav"), AppCommand::LoadNavigation));
        assert!(matches!(parse("/nav reload"), AppCommand::LoadNavigation));
        assert!(matches!(parse("nav sideways"), AppCommand::Unknown(_)));
        assert!(matches!(
            parse("layout mobile"),
            AppCommand::SetLayout(NavLayout::Mobile)
        ));
        assert!(matches!(parse("layout"), AppCommand::Unknown(_)));
    }

    #[test]
    fn department_commands_normalise_codes() {
        match parse("open /departments/CSE/") {
            AppCommand::OpenDepartment { slug } => assert_eq!(slug, "cse"),
            other => panic!("unexpected {:?}", other),
        }
        match parse("edit mba") {
            AppCommand::EditDepartment { code } => assert_eq!(code, "MBA"),
            other => panic!("unexpected {:?}", other),
        }
        match parse("delete civil") {
            AppCommand::DeleteDepartment { code } => assert_eq!(code, "CIVIL"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(parse("open"), AppCommand::Unknown(m) if m == "usage: open <code>"));
    }

    #[test]
    fn misc_commands() {
        assert!(matches!(parse("departments"), AppCommand::LoadDepartments));
        assert!(matches!(parse("new"), AppCommand::NewDepartment));
        assert!(matches!(parse("h"), AppCommand::Help));
        assert!(matches!(parse("exit"), AppCommand::Quit));
        assert!(matches!(parse("launch x"), AppCommand::Unknown(m) if m == "unknown command: launch"));
        assert!(matches!(parse("   "), AppCommand::Unknown(m) if m.is_empty()));
    }
}
