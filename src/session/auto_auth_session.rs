use super::dto::{error_message, LoginRequest, RefreshRequest, RefreshResponse, TokenPair};
use super::urls::{join_url, PATH_LOGIN, PATH_TOKEN_REFRESH};
use crate::api::ApiError;
use log::{info, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
struct Tokens {
    access: Option<String>,
    refresh: Option<String>,
}

/// 自动认证会话
///
/// 每个请求都带上 Bearer token；收到 401 时先用 refresh token 换新的
/// access token（失败则用账号密码重新登录），然后把原请求重发一次。
pub struct AutoAuthSession {
    client: Client,
    base_url: String,
    tokens: RwLock<Tokens>,
    credentials: Option<(String, String)>,
}

impl AutoAuthSession {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tokens: RwLock::new(Tokens::default()),
            credentials: None,
        }
    }

    pub fn with_tokens(self, access: Option<String>, refresh: Option<String>) -> Self {
        Self {
            tokens: RwLock::new(Tokens { access, refresh }),
            ..self
        }
    }

    pub fn with_credentials(self, email: String, password: String) -> Self {
        Self {
            credentials: Some((email, password)),
            ..self
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub async fn has_token(&self) -> bool {
        self.tokens.read().await.access.is_some()
    }

    /// 账号密码登录，成功后保存 token 对
    pub async fn login(&self) -> Result<(), ApiError> {
        let Some((email, password)) = &self.credentials else {
            return Err(ApiError::Unauthorized);
        };
        let resp = self
            .client
            .post(self.url(PATH_LOGIN))
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!("{} login(...) failed [{}]: {}", self, status, body);
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                    ApiError::Validation(error_message(&body))
                }
                _ => ApiError::Status {
                    status: status.as_u16(),
                    message: error_message(&body),
                },
            });
        }
        let pair: TokenPair = resp
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        *self.tokens.write().await = Tokens {
            access: Some(pair.access),
            refresh: Some(pair.refresh),
        };
        info!("{} login(...) [ok]", self);
        Ok(())
    }

    /// 用 refresh token 换 access token；返回是否拿到了新 token
    pub async fn refresh(&self) -> Result<bool, ApiError> {
        let refresh = self.tokens.read().await.refresh.clone();
        let Some(refresh) = refresh else {
            return Ok(false);
        };
        let resp = self
            .client
            .post(self.url(PATH_TOKEN_REFRESH))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;
        if !resp.status().is_success() {
            warn!("{} refresh(...) rejected [{}]", self, resp.status());
            *self.tokens.write().await = Tokens::default();
            return Ok(false);
        }
        let body: RefreshResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let mut tokens = self.tokens.write().await;
        tokens.access = Some(body.access);
        if let Some(rotated) = body.refresh {
            tokens.refresh = Some(rotated);
        }
        info!("{} refresh(...) [ok]", self);
        Ok(true)
    }

    async fn reauthenticate(&self) -> Result<bool, ApiError> {
        if self.refresh().await? {
            return Ok(true);
        }
        if self.credentials.is_some() {
            self.login().await?;
            return Ok(true);
        }
        Ok(false)
    }

    async fn send<F>(&self, builder: &F) -> Result<Response, ApiError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let access = self.tokens.read().await.access.clone();
        let mut request = builder(&self.client);
        if let Some(token) = access {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }

    /// 执行 HTTP 请求（带自动认证）
    ///
    /// `builder` 会被调用两次（重试时），multipart 表单需在闭包内重新构造。
    pub async fn request<F>(&self, builder: F) -> Result<Response, ApiError>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let resp = self.send(&builder).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }
        if !self.reauthenticate().await? {
            return Ok(resp);
        }
        let retried = self.send(&builder).await?;
        if retried.status() == StatusCode::UNAUTHORIZED {
            warn!("{} request(...) still unauthorized after re-auth", self);
        }
        Ok(retried)
    }
}

impl std::fmt::Display for AutoAuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<AutoAuthSession [{}]>", self.base_url)
    }
}

impl std::fmt::Debug for AutoAuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<AutoAuthSession [{}]>", self.base_url)
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[derive(Debug, Clone)]
    pub struct SeenRequest {
        pub line: String,
        pub authorization: Option<String>,
        pub body: String,
    }

    pub fn test_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    /// 按顺序回放预设响应的本地 HTTP 服务，每个连接处理一个请求
    pub async fn serve(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                let header_end = loop {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break None;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                        break Some(pos + 4);
                    }
                };
                let Some(header_end) = header_end else {
                    continue;
                };
                let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
                let content_length = head
                    .lines()
                    .find_map(|l| {
                        let (k, v) = l.split_once(':')?;
                        k.eq_ignore_ascii_case("content-length")
                            .then(|| v.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                while buf.len() < header_end + content_length {
                    let n = socket.read(&mut chunk).await.unwrap();
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }
                let authorization = head.lines().find_map(|l| {
                    let (k, v) = l.split_once(':')?;
                    k.eq_ignore_ascii_case("authorization")
                        .then(|| v.trim().to_string())
                });
                log.lock().unwrap().push(SeenRequest {
                    line: head.lines().next().unwrap_or_default().to_string(),
                    authorization,
                    body: String::from_utf8_lossy(&buf[header_end..]).to_string(),
                });
                let reply = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });
        (format!("http://{}/api", addr), seen)
    }
}

#[cfg(test)]
mod tests {
    use super::stub::{serve, test_client};
    use super::*;

    #[tokio::test]
    async fn refreshes_once_on_401_and_retries() {
        let (base, seen) = serve(vec![
            (401, r#"{"detail": "expired"}"#),
            (200, r#"{"access": "fresh"}"#),
            (200, r#"[]"#),
        ])
        .await;
        let session = AutoAuthSession::new(test_client(), base)
            .with_tokens(Some("stale".into()), Some("r1".into()));

        let url = session.url("/programs/");
        let resp = session.request(|c| c.get(&url)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer stale"));
        assert!(seen[1].line.starts_with("POST /api/auth/token/refresh/"));
        assert!(seen[1].body.contains("\"refresh\":\"r1\""));
        assert_eq!(seen[2].authorization.as_deref(), Some("Bearer fresh"));
    }

    #[tokio::test]
    async fn gives_up_when_refresh_is_rejected() {
        let (base, seen) = serve(vec![
            (401, r#"{"detail": "expired"}"#),
            (401, r#"{"detail": "refresh expired"}"#),
        ])
        .await;
        let session = AutoAuthSession::new(test_client(), base)
            .with_tokens(Some("stale".into()), Some("r1".into()));

        let url = session.url("/departments/");
        let resp = session.request(|c| c.get(&url)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(!session.has_token().await);
    }

    #[tokio::test]
    async fn login_stores_token_pair() {
        let (base, seen) = serve(vec![(200, r#"{"access": "a1", "refresh": "r1", "user": {}}"#)]).await;
        let session = AutoAuthSession::new(test_client(), base)
            .with_credentials("admin@college.edu".into(), "secret".into());

        session.login().await.unwrap();
        assert!(session.has_token().await);
        let seen = seen.lock().unwrap().clone();
        assert!(seen[0].line.starts_with("POST /api/auth/login/"));
        assert!(seen[0].body.contains("admin@college.edu"));
    }
}
