//! Application context: REST client, persisted session and permission gate.
//!
//! Guarded operations check locally first and return [`AppError::Denied`]
//! without sending a request; the backend still has the final say.

use thiserror::Error;

use blogdesk_auth::{
    GuardDecision, KeyValueStore, PermissionGate, Principal, Requirement, Role, SessionStore, StoreError, explain,
};
use blogdesk_client::{ApiClient, ApiError, BlogPost, BlogPostPage, BlogPostQuery, User};
use blogdesk_core::{BlogPostId, DomainError, UserId};

use crate::actions::{PostActions, PostWriteRoute, Toolbar};
use crate::forms::{BlogPostForm, FormErrors, LoginForm, UserForm};
use crate::routes::{self, Navigation, Route};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid input: {0}")]
    Validation(#[from] FormErrors),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("session storage failed: {0}")]
    Session(#[from] StoreError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("access denied to {target}: {reason}")]
    Denied { target: String, reason: String },
}

impl AppError {
    /// Message for the login screen.
    pub fn login_message(&self) -> String {
        match self {
            Self::Api(err) if err.is_auth_failure() => "Invalid email or password. Please try again.".to_string(),
            Self::Api(ApiError::Network(_)) => "Connection error. Please check your internet connection.".to_string(),
            other => other.to_string(),
        }
    }

    fn denied(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Denied {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

pub struct AppContext<S> {
    client: ApiClient,
    gate: PermissionGate<SessionStore<S>>,
}

impl<S: KeyValueStore> AppContext<S> {
    /// Resume whatever session `store` holds.
    pub fn new(mut client: ApiClient, store: S) -> Self {
        let session = SessionStore::new(store);
        tracing::debug!(signed_in = session.is_signed_in(), "session restored");
        if client.token().is_none() {
            client.set_token(session.token());
        }
        Self {
            client,
            gate: PermissionGate::new(session),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn gate(&self) -> &PermissionGate<SessionStore<S>> {
        &self.gate
    }

    pub fn session(&self) -> &SessionStore<S> {
        self.gate.source()
    }

    pub fn principal(&self) -> Option<Principal> {
        self.gate.principal()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────

    pub async fn login(&mut self, form: LoginForm) -> Result<Principal, AppError> {
        let (email, password) = form.into_credentials()?;
        let response = self.client.login(&email, &password).await.inspect_err(|err| {
            tracing::warn!(status = ?err.status(), error = %err, "login failed");
        })?;

        self.gate
            .source_mut()
            .login(&response.principal, response.token.as_deref())?;
        self.client.set_token(response.token);
        Ok(response.principal)
    }

    /// Remove the record, then clear the gate. The gate is cleared even when
    /// removing the record fails.
    pub fn logout(&mut self) -> Result<(), AppError> {
        let removed = self.gate.source_mut().logout();
        self.gate.clear();
        self.client.set_token(None);
        removed.map_err(AppError::from)
    }

    /// Re-fetch the signed-in user and rewrite the record.
    pub async fn refresh_profile(&mut self) -> Result<Principal, AppError> {
        let id = self
            .principal()
            .and_then(|p| p.id)
            .ok_or_else(|| AppError::denied("/user", "not signed in"))?;
        let principal = self.client.get_user(id).await?;
        self.gate.source_mut().refresh_profile(&principal)?;
        Ok(principal)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Navigation and visibility
    // ─────────────────────────────────────────────────────────────────────

    pub fn navigate(&self, path: &str) -> Navigation {
        routes::resolve(&self.gate, path)
    }

    pub fn post_actions(&self, post: &BlogPost) -> PostActions {
        PostActions::for_post(&self.gate, post)
    }

    pub fn toolbar(&self) -> Toolbar {
        Toolbar::for_gate(&self.gate)
    }

    fn require(&self, target: &str, requirement: &Requirement) -> Result<(), AppError> {
        let explanation = explain(&self.gate, requirement);
        match explanation.decision {
            GuardDecision::Render => Ok(()),
            GuardDecision::RedirectToLogin | GuardDecision::Unauthorized => {
                tracing::debug!(target_path = target, reason = %explanation.reason, "refused locally");
                Err(AppError::denied(target, explanation.reason))
            }
        }
    }

    fn require_signed_in(&self, target: &str) -> Result<(), AppError> {
        match self.principal() {
            Some(_) => Ok(()),
            None => Err(AppError::denied(target, "not signed in")),
        }
    }

    fn require_route(&self, route: Route) -> Result<(), AppError> {
        self.require(&route.path(), &route.requirement())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Posts
    // ─────────────────────────────────────────────────────────────────────

    pub async fn list_posts(&self, query: &BlogPostQuery) -> Result<BlogPostPage, AppError> {
        Ok(self.client.list_posts(query).await?)
    }

    pub async fn get_post(&self, id: BlogPostId) -> Result<BlogPost, AppError> {
        Ok(self.client.get_post(id).await?)
    }

    pub async fn create_post(&self, form: BlogPostForm) -> Result<BlogPost, AppError> {
        self.require_route(Route::BlogPostCreate)?;
        let draft = form.into_draft()?;
        Ok(self.client.create_post(&draft).await?)
    }

    /// Save edits to a post already fetched with [`AppContext::get_post`].
    ///
    /// Edit is allowed to the author and to holders of `BLOGPOST_MODIFY`.
    pub async fn edit_post(&self, post: &BlogPost, form: BlogPostForm) -> Result<BlogPost, AppError> {
        let id = post
            .id
            .ok_or_else(|| DomainError::validation("post id is required for an update"))?;
        self.require_signed_in(&Route::BlogPostEdit(id).path())?;
        if !self.post_actions(post).can_edit {
            return Err(AppError::denied(Route::BlogPostEdit(id).path(), "not the author and missing BLOGPOST_MODIFY"));
        }
        let draft = form.into_draft()?;
        let updated = match PostWriteRoute::for_post(&self.gate, post) {
            PostWriteRoute::Standard => self.client.update_post(id, &draft).await?,
            PostWriteRoute::Admin => self.client.admin_update_post(id, &draft).await?,
        };
        Ok(updated)
    }

    /// Delete is allowed to the author and to holders of `BLOGPOST_DELETE`.
    pub async fn delete_post(&self, id: BlogPostId) -> Result<(), AppError> {
        self.require_signed_in(&Route::BlogPostDetail(id).path())?;
        let post = self.client.get_post(id).await?;
        if !self.post_actions(&post).can_delete {
            return Err(AppError::denied(Route::BlogPostDetail(id).path(), "not the author and missing BLOGPOST_DELETE"));
        }
        match PostWriteRoute::for_post(&self.gate, &post) {
            PostWriteRoute::Standard => self.client.delete_post(id).await?,
            PostWriteRoute::Admin => self.client.admin_delete_post(id).await?,
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users and roles
    // ─────────────────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        self.require_route(Route::UserList)?;
        Ok(self.client.list_users().await?)
    }

    pub async fn get_user(&self, id: UserId) -> Result<User, AppError> {
        self.require_route(Route::UserEdit(id))?;
        Ok(self.client.get_user(id).await?)
    }

    /// Roles are only offered in admin mode (`USER_MODIFY`).
    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.require("/roles", &Requirement::authority(blogdesk_auth::Authority::USER_MODIFY))?;
        Ok(self.client.list_roles().await?)
    }

    pub async fn create_user(&self, form: UserForm) -> Result<User, AppError> {
        self.require_route(Route::UserCreate)?;
        form.check()?;
        let roles = self.roles_if_admin().await?;
        let registration = form.into_registration(&roles)?;
        Ok(self.client.register_user(&registration).await?)
    }

    pub async fn update_user(&self, form: UserForm) -> Result<User, AppError> {
        let id = form
            .id
            .ok_or_else(|| DomainError::validation("user id is required for an update"))?;
        self.require_route(Route::UserEdit(id))?;
        form.check()?;
        let roles = self.roles_if_admin().await?;
        let user = form.into_update(self.toolbar().user_admin_mode, &roles)?;
        Ok(self.client.update_user(id, &user).await?)
    }

    pub async fn delete_user(&self, id: UserId) -> Result<(), AppError> {
        self.require_route(Route::UserEdit(id))?;
        Ok(self.client.delete_user(id).await?)
    }

    async fn roles_if_admin(&self) -> Result<Vec<Role>, AppError> {
        if self.toolbar().user_admin_mode {
            Ok(self.client.list_roles().await?)
        } else {
            Ok(Vec::new())
        }
    }
}
