pub mod auto_auth_session;
pub mod college_session;
pub mod dto;
pub mod urls;

pub use auto_auth_session::AutoAuthSession;
pub use college_session::CollegeSession;
pub use urls::*;

use crate::api::ApiError;
use std::time::Duration;

/// 构造访问后端的 HTTP 客户端；`proxy` 不带协议时按 socks5h 处理
pub fn build_http_client(proxy: Option<&str>) -> Result<reqwest::Client, ApiError> {
    let mut builder = reqwest::Client::builder()
        .cookie_store(true)
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("campusdesk/", env!("CARGO_PKG_VERSION")));

    if let Some(raw) = proxy {
        let t = raw.trim();
        if !t.is_empty() {
            let url = if t.contains("://") {
                t.to_string()
            } else {
                format!("socks5h://{}", t)
            };
            let proxy = reqwest::Proxy::all(&url).map_err(|e| ApiError::Http(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
    }

    builder.build().map_err(|e| ApiError::Http(e.to_string()))
}
