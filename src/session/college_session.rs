use super::auto_auth_session::AutoAuthSession;
use super::urls::*;
use crate::api::{ApiError, FormData, NewProgram, NewTrade};
use log::info;
use reqwest::Response;

/// College Session - 学院网站后端的会话
///
/// 包装 AutoAuthSession，按资源提供 REST 调用，返回原始响应。
pub struct CollegeSession {
    session: AutoAuthSession,
}

impl CollegeSession {
    pub fn new(session: AutoAuthSession) -> Self {
        Self { session }
    }

    pub fn auth(&self) -> &AutoAuthSession {
        &self.session
    }

    pub async fn list_programs(&self) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_PROGRAMS);
        let resp = self.session.request(|client| client.get(&url)).await?;
        info!("{} list_programs(...) [{}]", self, url);
        Ok(resp)
    }

    pub async fn get_program(&self, id: &str) -> Result<Response, ApiError> {
        let url = self.session.url(&path_program(id));
        self.session.request(|client| client.get(&url)).await
    }

    pub async fn program_hierarchy(&self) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_PROGRAM_HIERARCHY);
        let resp = self.session.request(|client| client.get(&url)).await?;
        info!("{} program_hierarchy(...) [{}]", self, url);
        Ok(resp)
    }

    pub async fn create_program(&self, body: &NewProgram) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_PROGRAMS);
        let resp = self
            .session
            .request(|client| client.post(&url).json(body))
            .await?;
        info!("{} create_program(...) [{}]", self, body.code);
        Ok(resp)
    }

    pub async fn list_trades(&self, program_id: Option<&str>) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_TRADES);
        let resp = self
            .session
            .request(|client| {
                let req = client.get(&url);
                match program_id {
                    Some(pid) => req.query(&[("program_id", pid)]),
                    None => req,
                }
            })
            .await?;
        info!("{} list_trades(...) [{:?}]", self, program_id);
        Ok(resp)
    }

    pub async fn get_trade(&self, id: &str) -> Result<Response, ApiError> {
        let url = self.session.url(&path_trade(id));
        self.session.request(|client| client.get(&url)).await
    }

    pub async fn create_trade(&self, body: &NewTrade) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_TRADES);
        let resp = self
            .session
            .request(|client| client.post(&url).json(body))
            .await?;
        info!("{} create_trade(...) [{}]", self, body.code);
        Ok(resp)
    }

    pub async fn list_departments(&self) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_DEPARTMENTS);
        self.session.request(|client| client.get(&url)).await
    }

    pub async fn get_department(&self, id: &str) -> Result<Response, ApiError> {
        let url = self.session.url(&path_department(id));
        self.session.request(|client| client.get(&url)).await
    }

    pub async fn create_department(&self, form: &FormData) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_DEPARTMENTS);
        let resp = self
            .session
            .request(|client| client.post(&url).multipart(form.to_multipart()))
            .await?;
        info!("{} create_department(...) [{}]", self, resp.status());
        Ok(resp)
    }

    pub async fn update_department(
        &self,
        id: &str,
        form: &FormData,
    ) -> Result<Response, ApiError> {
        let url = self.session.url(&path_department(id));
        let resp = self
            .session
            .request(|client| client.put(&url).multipart(form.to_multipart()))
            .await?;
        info!("{} update_department(...) [{}]", self, resp.status());
        Ok(resp)
    }

    pub async fn delete_department(&self, id: &str) -> Result<Response, ApiError> {
        let url = self.session.url(&path_department(id));
        let resp = self.session.request(|client| client.delete(&url)).await?;
        info!("{} delete_department(...) [{}]", self, resp.status());
        Ok(resp)
    }

    pub async fn list_gallery_items(
        &self,
        department_id: Option<&str>,
    ) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_GALLERY);
        self.session
            .request(|client| {
                let req = client.get(&url);
                match department_id {
                    Some(id) => req.query(&[("department", id)]),
                    None => req,
                }
            })
            .await
    }

    pub async fn create_gallery_item(&self, form: &FormData) -> Result<Response, ApiError> {
        let url = self.session.url(PATH_GALLERY);
        let resp = self
            .session
            .request(|client| client.post(&url).multipart(form.to_multipart()))
            .await?;
        info!("{} create_gallery_item(...) [{}]", self, resp.status());
        Ok(resp)
    }
}

impl std::fmt::Display for CollegeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<CollegeSession [{}]>", self.session.base_url())
    }
}

impl std::fmt::Debug for CollegeSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<CollegeSession [{}]>", self.session.base_url())
    }
}
