use crate::session::DEFAULT_API_URL;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "sqlite" => Ok(BackendKind::Local),
            "remote" | "http" | "api" => Ok(BackendKind::Remote),
            other => Err(format!("unknown backend: {}", other)),
        }
    }
}

/// 导航菜单的呈现方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavLayout {
    #[default]
    Desktop,
    Mobile,
}

impl NavLayout {
    pub fn toggled(self) -> Self {
        match self {
            NavLayout::Desktop => NavLayout::Mobile,
            NavLayout::Mobile => NavLayout::Desktop,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NavLayout::Desktop => "desktop",
            NavLayout::Mobile => "mobile",
        }
    }
}

impl FromStr for NavLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" | "d" => Ok(NavLayout::Desktop),
            "mobile" | "m" => Ok(NavLayout::Mobile),
            other => Err(format!("unknown layout: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendKind,
    pub api_url: String,
    pub proxy: Option<String>,
    pub database_url: String,
    pub media_root: PathBuf,
    pub email: Option<String>,
    pub password: Option<String>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub nav_layout: NavLayout,
    pub seed: bool,
}

impl AppConfig {
    /// 先加载 .env，再从进程环境变量读取
    pub fn load() -> (Self, Vec<String>) {
        let mut info = Vec::new();
        match dotenv::dotenv() {
            Ok(path) => info.push(format!("✓ Loaded {}", path.display())),
            Err(_) => info.push("⚠ No .env file found, using process environment".to_string()),
        }
        let (config, more) = Self::from_lookup(|key| std::env::var(key).ok());
        info.extend(more);
        (config, info)
    }

    pub fn from_lookup<F>(get: F) -> (Self, Vec<String>)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut info = Vec::new();
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match var("COLLEGE_BACKEND").map(|v| v.parse::<BackendKind>()) {
            None => BackendKind::Local,
            Some(Ok(kind)) => kind,
            Some(Err(e)) => {
                info.push(format!("⚠ {}, falling back to local", e));
                BackendKind::Local
            }
        };
        let nav_layout = match var("COLLEGE_NAV_LAYOUT").map(|v| v.parse::<NavLayout>()) {
            None => NavLayout::Desktop,
            Some(Ok(layout)) => layout,
            Some(Err(e)) => {
                info.push(format!("⚠ {}, using desktop", e));
                NavLayout::Desktop
            }
        };
        let seed = var("COLLEGE_SEED")
            .map(|v| !matches!(v.to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        let config = Self {
            backend,
            api_url: var("COLLEGE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            proxy: var("COLLEGE_PROXY"),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://college.db?mode=rwc".to_string()),
            media_root: var("COLLEGE_MEDIA_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("media")),
            email: var("COLLEGE_EMAIL"),
            password: var("COLLEGE_PASSWORD"),
            access_token: var("COLLEGE_ACCESS_TOKEN"),
            refresh_token: var("COLLEGE_REFRESH_TOKEN"),
            nav_layout,
            seed,
        };

        match config.backend {
            BackendKind::Local => {
                info.push(format!("Backend: local ({})", config.database_url));
            }
            BackendKind::Remote => {
                info.push(format!("Backend: remote ({})", config.api_url));
                if config.credentials().is_none() && config.access_token.is_none() {
                    info.push(
                        "⚠ COLLEGE_EMAIL/COLLEGE_PASSWORD not set, requests are anonymous"
                            .to_string(),
                    );
                }
            }
        }
        (config, info)
    }

    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.clone(), password.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> (AppConfig, Vec<String>) {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_to_local_sqlite() {
        let (config, _) = load(&[]);
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.api_url, "http://localhost:8000/api");
        assert_eq!(config.database_url, "sqlite://college.db?mode=rwc");
        assert_eq!(config.media_root, PathBuf::from("media"));
        assert_eq!(config.nav_layout, NavLayout::Desktop);
        assert!(config.seed);
        assert!(config.credentials().is_none());
    }

    #[test]
    fn remote_with_credentials() {
        let (config, info) = load(&[
            ("COLLEGE_BACKEND", "Remote"),
            ("COLLEGE_API_URL", "https://college.example/api"),
            ("COLLEGE_EMAIL", "admin@college.example"),
            ("COLLEGE_PASSWORD", "secret"),
            ("COLLEGE_NAV_LAYOUT", "mobile"),
            ("COLLEGE_SEED", "off"),
        ]);
        assert_eq!(config.backend, BackendKind::Remote);
        assert_eq!(config.nav_layout, NavLayout::Mobile);
        assert!(!config.seed);
        assert_eq!(
            config.credentials(),
            Some(("admin@college.example".into(), "secret".into()))
        );
        assert!(info.iter().all(|l| !l.starts_with('⚠')));
    }

    #[test]
    fn bad_values_fall_back_with_warning() {
        let (config, info) = load(&[("COLLEGE_BACKEND", "ftp"), ("COLLEGE_PROXY", "  ")]);
        assert_eq!(config.backend, BackendKind::Local);
        assert_eq!(config.proxy, None);
        assert!(info[0].contains("unknown backend: ftp"));
    }
}
