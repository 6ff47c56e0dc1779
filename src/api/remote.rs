use super::{
    ApiError, CollegeApi, Department, FormData, GalleryItem, NewProgram, NewTrade, Program, Trade,
};
use crate::hierarchy::ProgramNode;
use crate::session::dto::{error_message, ListEnvelope};
use crate::session::CollegeSession;
use async_trait::async_trait;
use log::{info, warn};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// 走 REST 接口的后端
pub struct RemoteBackend {
    session: CollegeSession,
}

impl RemoteBackend {
    pub fn new(session: CollegeSession) -> Self {
        Self { session }
    }

    /// 没有 token 但配置了账号时先登录一次
    pub async fn ensure_login(&self) -> Result<(), ApiError> {
        if self.session.auth().has_token().await {
            return Ok(());
        }
        self.session.auth().login().await?;
        info!("{} logged in", self.session);
        Ok(())
    }
}

async fn check(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body);
    warn!("request failed [{}]: {}", status, message);
    Err(match status {
        StatusCode::BAD_REQUEST => ApiError::Validation(message),
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(message),
        _ => ApiError::Status {
            status: status.as_u16(),
            message,
        },
    })
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    check(resp)
        .await?
        .json::<T>()
        .await
        .map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

async fn decode_list<T: DeserializeOwned>(resp: Response) -> Result<Vec<T>, ApiError> {
    decode::<ListEnvelope<T>>(resp).await.map(ListEnvelope::into_vec)
}

#[async_trait]
impl CollegeApi for RemoteBackend {
    async fn list_programs(&self) -> Result<Vec<Program>, ApiError> {
        decode_list(self.session.list_programs().await?).await
    }

    async fn get_program(&self, id: &str) -> Result<Program, ApiError> {
        decode(self.session.get_program(id).await?).await
    }

    async fn program_hierarchy(&self) -> Result<Vec<ProgramNode>, ApiError> {
        decode_list(self.session.program_hierarchy().await?).await
    }

    async fn create_program(&self, program: NewProgram) -> Result<Program, ApiError> {
        decode(self.session.create_program(&program).await?).await
    }

    async fn list_trades(&self, program_id: Option<&str>) -> Result<Vec<Trade>, ApiError> {
        decode_list(self.session.list_trades(program_id).await?).await
    }

    async fn get_trade(&self, id: &str) -> Result<Trade, ApiError> {
        decode(self.session.get_trade(id).await?).await
    }

    async fn create_trade(&self, trade: NewTrade) -> Result<Trade, ApiError> {
        decode(self.session.create_trade(&trade).await?).await
    }

    async fn list_departments(&self) -> Result<Vec<Department>, ApiError> {
        decode_list(self.session.list_departments().await?).await
    }

    async fn get_department(&self, id: &str) -> Result<Department, ApiError> {
        decode(self.session.get_department(id).await?).await
    }

    async fn create_department(&self, form: FormData) -> Result<Department, ApiError> {
        decode(self.session.create_department(&form).await?).await
    }

    async fn update_department(&self, id: &str, form: FormData) -> Result<Department, ApiError> {
        decode(self.session.update_department(id, &form).await?).await
    }

    async fn delete_department(&self, id: &str) -> Result<(), ApiError> {
        check(self.session.delete_department(id).await?).await?;
        Ok(())
    }

    async fn list_gallery_items(
        &self,
        department_id: Option<&str>,
    ) -> Result<Vec<GalleryItem>, ApiError> {
        decode_list(self.session.list_gallery_items(department_id).await?).await
    }

    async fn create_gallery_item(&self, form: FormData) -> Result<GalleryItem, ApiError> {
        decode(self.session.create_gallery_item(&form).await?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::auto_auth_session::stub::{serve, test_client};
    use crate::session::AutoAuthSession;

    fn backend(base: String) -> RemoteBackend {
        RemoteBackend::new(CollegeSession::new(AutoAuthSession::new(test_client(), base)))
    }

    #[tokio::test]
    async fn lists_accept_paged_envelope() {
        let (base, seen) = serve(vec![(
            200,
            r#"{"count": 1, "next": null, "results": [{"id": "t1", "name": "B.Tech", "code": "BTECH", "program": "p1"}]}"#,
        )])
        .await;
        let trades = backend(base).list_trades(Some("p1")).await.unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].program_id, "p1");
        assert!(seen.lock().unwrap()[0].line.contains("/api/trades/?program_id=p1"));
    }

    #[tokio::test]
    async fn hierarchy_accepts_bare_array() {
        let (base, _) = serve(vec![(
            200,
            r#"[{"id": "p1", "name": "UG", "trades": [], "direct_branches": [{"id": "d1", "name": "MBA", "code": "MBA"}]}]"#,
        )])
        .await;
        let tree = backend(base).program_hierarchy().await.unwrap();
        assert!(tree[0].has_children());
    }

    #[tokio::test]
    async fn maps_error_statuses() {
        let (base, _) = serve(vec![
            (400, r#"{"code": ["department with this code already exists."]}"#),
            (404, r#"{"detail": "Not found."}"#),
            (500, "oops"),
        ])
        .await;
        let api = backend(base);

        let err = api.create_department(FormData::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m.starts_with("code:")));
        assert!(matches!(
            api.get_department("missing").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            api.delete_department("d1").await,
            Err(ApiError::Status { status: 500, .. })
        ));
    }
}
