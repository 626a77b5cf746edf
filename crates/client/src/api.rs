//! HTTP bindings, one method per backend endpoint.

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use blogdesk_auth::{Principal, Role};
use blogdesk_core::{BlogPostId, UserId};

use crate::dto::{BlogPost, BlogPostDraft, BlogPostPage, BlogPostQuery, LoginRequest, User, UserRegistration};
use crate::error::ApiError;

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub principal: Principal,
    /// Value of the `Authorization` response header, if the backend sent one.
    pub token: Option<String>,
}

/// Client for the blog REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    token: Option<String>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let mut client = Self::new(base_url);
        client.set_token(Some(token.into()));
        client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.trim().is_empty());
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────

    /// `POST /user/login`. The principal comes back in the body, the token in
    /// the `Authorization` header.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let req = self
            .http
            .post(self.url("/user/login"))
            .json(&LoginRequest { email, password });
        let resp = self.execute(Method::POST, "/user/login", req).await?;

        let token = resp
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let principal = resp.json::<Principal>().await?;

        Ok(LoginResponse { principal, token })
    }

    // ─────────────────────────────────────────────────────────────────────
    // Blog posts
    // ─────────────────────────────────────────────────────────────────────

    /// `GET /blogpost` with paging, sorting and filters.
    pub async fn list_posts(&self, query: &BlogPostQuery) -> Result<BlogPostPage, ApiError> {
        let req = self.request(Method::GET, "/blogpost").query(query);
        self.send(Method::GET, "/blogpost", req).await
    }

    pub async fn get_post(&self, id: BlogPostId) -> Result<BlogPost, ApiError> {
        let path = format!("/blogpost/{id}");
        self.send(Method::GET, &path, self.request(Method::GET, &path)).await
    }

    pub async fn create_post(&self, draft: &BlogPostDraft) -> Result<BlogPost, ApiError> {
        let req = self.request(Method::POST, "/blogpost").json(draft);
        self.send(Method::POST, "/blogpost", req).await
    }

    /// `PUT /blogpost/:id` (author, or holder of `BLOGPOST_EDIT_ANY`).
    pub async fn update_post(&self, id: BlogPostId, draft: &BlogPostDraft) -> Result<BlogPost, ApiError> {
        let path = format!("/blogpost/{id}");
        let req = self.request(Method::PUT, &path).json(draft);
        self.send(Method::PUT, &path, req).await
    }

    /// `PUT /blogpost/admin/:id` (holder of `BLOGPOST_MODIFY`).
    pub async fn admin_update_post(&self, id: BlogPostId, draft: &BlogPostDraft) -> Result<BlogPost, ApiError> {
        let path = format!("/blogpost/admin/{id}");
        let req = self.request(Method::PUT, &path).json(draft);
        self.send(Method::PUT, &path, req).await
    }

    pub async fn delete_post(&self, id: BlogPostId) -> Result<(), ApiError> {
        let path = format!("/blogpost/{id}");
        self.send_empty(Method::DELETE, &path, self.request(Method::DELETE, &path)).await
    }

    pub async fn admin_delete_post(&self, id: BlogPostId) -> Result<(), ApiError> {
        let path = format!("/blogpost/admin/{id}");
        self.send_empty(Method::DELETE, &path, self.request(Method::DELETE, &path)).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users & roles
    // ─────────────────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.send(Method::GET, "/user", self.request(Method::GET, "/user")).await
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        let path = format!("/user/{id}");
        self.send(Method::GET, &path, self.request(Method::GET, &path)).await
    }

    pub async fn update_user(&self, id: UserId, user: &User) -> Result<User, ApiError> {
        let path = format!("/user/{id}");
        let req = self.request(Method::PUT, &path).json(user);
        self.send(Method::PUT, &path, req).await
    }

    pub async fn register_user(&self, registration: &UserRegistration) -> Result<User, ApiError> {
        let req = self.request(Method::POST, "/user/register").json(registration);
        self.send(Method::POST, "/user/register", req).await
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        let path = format!("/user/{id}");
        self.send_empty(Method::DELETE, &path, self.request(Method::DELETE, &path)).await
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, ApiError> {
        self.send(Method::GET, "/roles", self.request(Method::GET, "/roles")).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.http.request(method, self.url(path));
        match &self.token {
            Some(token) => req.header(AUTHORIZATION, bearer(token)),
            None => req,
        }
    }

    async fn execute(&self, method: Method, path: &str, req: RequestBuilder) -> Result<Response, ApiError> {
        tracing::debug!(%method, path, "api request");
        let resp = req.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "api request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let err = ApiError::from_status(status.as_u16(), &body);
        tracing::warn!(%method, path, status = status.as_u16(), error = %err, "api error response");
        Err(err)
    }

    async fn send<T: DeserializeOwned>(&self, method: Method, path: &str, req: RequestBuilder) -> Result<T, ApiError> {
        let resp = self.execute(method, path, req).await?;
        resp.json::<T>().await.map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn send_empty(&self, method: Method, path: &str, req: RequestBuilder) -> Result<(), ApiError> {
        self.execute(method, path, req).await.map(|_| ())
    }
}

/// Tokens are stored as the backend sent them; add the scheme if it is missing.
fn bearer(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {token}")
    }
}
