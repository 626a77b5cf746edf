//! Form models and their validation rules.
//!
//! Field rules are declared with `validator`; "required" checks run after so a
//! blank field reports one message instead of every rule it breaks.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use blogdesk_auth::{Principal, Role};
use blogdesk_client::{BlogPost, BlogPostDraft, User, UserRegistration};
use blogdesk_core::{RoleId, UserId};

/// Categories offered when writing a post.
pub const SUGGESTED_CATEGORIES: [&str; 5] = ["Technology", "Lifestyle", "Travel", "Sports", "Other"];

/// Name of the role preselected for new users.
pub const DEFAULT_ROLE_NAME: &str = "USER";

pub const MIN_PASSWORD_LEN: usize = 4;

/// Per-field validation messages, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(message.into());
    }

    /// Messages for one field; empty when the field is valid.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn summary(&self) -> String {
        self.fields
            .iter()
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// A blank value replaces whatever else the field reported.
    fn require(&mut self, field: &str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.fields.insert(field.to_string(), vec![message.to_string()]);
        }
    }

    fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl core::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.summary())
    }
}

impl std::error::Error for FormErrors {}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = Self::new();
        for (field, list) in errors.field_errors() {
            for error in list {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.push(field.to_string(), message);
            }
        }
        out
    }
}

fn collect(form: &impl Validate) -> FormErrors {
    form.validate().err().map(FormErrors::from).unwrap_or_default()
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validated `(email, password)`; the email is lowercased.
    pub fn into_credentials(self) -> Result<(String, String), FormErrors> {
        let mut errors = collect(&self);
        errors.require("email", &self.email, "Email is required");
        errors.require("password", &self.password, "Password is required");
        errors.into_result()?;
        Ok((self.email.trim().to_lowercase(), self.password))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
pub struct BlogPostForm {
    #[validate(length(min = 5, max = 100, message = "Title must be between 5 and 100 characters long"))]
    pub title: String,

    #[validate(length(min = 20, max = 50000, message = "Text must be between 20 and 50000 characters long"))]
    pub text: String,

    #[validate(length(max = 100, message = "Category must be at most 100 characters long"))]
    pub category: String,
}

impl BlogPostForm {
    pub fn new(title: impl Into<String>, text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            category: category.into(),
        }
    }

    /// Prefill from an existing post.
    pub fn from_post(post: &BlogPost) -> Self {
        let draft = BlogPostDraft::from(post);
        Self::new(draft.title, draft.text, draft.category)
    }

    pub fn check(&self) -> Result<(), FormErrors> {
        let mut errors = collect(self);
        errors.require("title", &self.title, "Title is required");
        errors.require("text", &self.text, "Text is required");
        errors.require("category", &self.category, "Category is required");
        errors.into_result()
    }

    pub fn into_draft(self) -> Result<BlogPostDraft, FormErrors> {
        self.check()?;
        Ok(BlogPostDraft {
            title: self.title,
            text: self.text,
            category: self.category,
        })
    }

    /// Category choices: the suggestions, plus the current value when it is
    /// not one of them.
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = SUGGESTED_CATEGORIES.iter().map(|c| c.to_string()).collect();
        if !self.category.trim().is_empty() && !out.contains(&self.category) {
            out.push(self.category.clone());
        }
        out
    }
}

/// Create-or-edit form for a user.
///
/// `id` is `None` when creating; the password is only checked then.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserForm {
    #[serde(default)]
    pub id: Option<UserId>,

    #[validate(length(min = 2, max = 50, message = "First name must be between 2 and 50 characters long"))]
    pub first_name: String,

    #[validate(length(min = 2, max = 50, message = "Last name must be between 2 and 50 characters long"))]
    pub last_name: String,

    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,

    #[serde(default)]
    pub password: Option<String>,

    /// Roles the user currently has; kept as-is unless a role is selected.
    #[serde(default)]
    pub roles: Vec<Role>,

    #[serde(default)]
    pub selected_role_id: Option<RoleId>,
}

impl UserForm {
    pub fn for_create() -> Self {
        Self::default()
    }

    /// Prefill from an existing user, preselecting their first role.
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password: None,
            roles: user.roles.clone(),
            selected_role_id: user.roles.first().and_then(|r| r.id),
        }
    }

    pub fn is_create(&self) -> bool {
        self.id.is_none()
    }

    pub fn check(&self) -> Result<(), FormErrors> {
        let mut errors = collect(self);
        errors.require("first_name", &self.first_name, "First name is required");
        errors.require("last_name", &self.last_name, "Last name is required");
        errors.require("email", &self.email, "Email is required");

        if self.is_create() {
            let password = self.password.as_deref().unwrap_or_default();
            if password.chars().count() < MIN_PASSWORD_LEN {
                errors.push(
                    "password",
                    format!("Password must be at least {MIN_PASSWORD_LEN} characters long"),
                );
            }
            errors.require("password", password, "Password is required");
        }
        errors.into_result()
    }

    /// Body for `POST /user/register`. Falls back to [`default_role`] when
    /// nothing is selected.
    pub fn into_registration(self, available: &[Role]) -> Result<UserRegistration, FormErrors> {
        self.check()?;
        let role_id = self
            .selected_role_id
            .or_else(|| default_role(available).and_then(|r| r.id));
        Ok(UserRegistration {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password.unwrap_or_default(),
            role_ids: role_id.into_iter().collect(),
        })
    }

    /// Body for `PUT /user/:id`.
    ///
    /// Only an admin may change roles: the selected role replaces the
    /// current ones when `admin_mode` is set and the role is known.
    pub fn into_update(self, admin_mode: bool, available: &[Role]) -> Result<User, FormErrors> {
        self.check()?;
        let selected = self
            .selected_role_id
            .filter(|_| admin_mode)
            .and_then(|id| available.iter().find(|r| r.id == Some(id)).cloned());
        let roles = match selected {
            Some(role) => vec![role],
            None => self.roles,
        };
        Ok(Principal {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            roles,
        })
    }
}

/// The role named `USER`, else the first one offered.
pub fn default_role(available: &[Role]) -> Option<&Role> {
    available
        .iter()
        .find(|r| r.name == DEFAULT_ROLE_NAME)
        .or_else(|| available.first())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().into_credentials().unwrap_err();
        assert_eq!(errors.field("email"), ["Email is required"]);
        assert_eq!(errors.field("password"), ["Password is required"]);
    }

    #[test]
    fn login_rejects_malformed_email() {
        let errors = LoginForm::new("not-an-email", "pw").into_credentials().unwrap_err();
        assert_eq!(errors.field("email"), ["Please enter a valid email"]);
        assert!(!errors.has("password"));
    }

    #[test]
    fn login_lowercases_email() {
        let (email, password) = LoginForm::new("Ada@Example.COM", "secret").into_credentials().unwrap();
        assert_eq!(email, "ada@example.com");
        assert_eq!(password, "secret");
    }

    #[test]
    fn post_form_length_bounds() {
        assert!(BlogPostForm::new(text(5), text(20), "Travel").check().is_ok());
        assert!(BlogPostForm::new(text(100), text(50000), text(100)).check().is_ok());

        let errors = BlogPostForm::new(text(4), text(19), text(101)).check().unwrap_err();
        assert_eq!(errors.field("title"), ["Title must be between 5 and 100 characters long"]);
        assert_eq!(errors.field("text"), ["Text must be between 20 and 50000 characters long"]);
        assert_eq!(errors.field("category"), ["Category must be at most 100 characters long"]);
    }

    #[test]
    fn blank_post_fields_report_required_only() {
        let errors = BlogPostForm::default().check().unwrap_err();
        assert_eq!(errors.field("title"), ["Title is required"]);
        assert_eq!(errors.field("text"), ["Text is required"]);
        assert_eq!(errors.field("category"), ["Category is required"]);
        assert!(errors.to_string().contains("title: Title is required"));
    }

    #[test]
    fn categories_include_custom_value_once() {
        let form = BlogPostForm::new("Title", "", "Cooking");
        let categories = form.categories();
        assert_eq!(categories.len(), SUGGESTED_CATEGORIES.len() + 1);
        assert_eq!(categories.last().map(String::as_str), Some("Cooking"));

        let form = BlogPostForm::new("Title", "", "Travel");
        assert_eq!(form.categories().len(), SUGGESTED_CATEGORIES.len());
    }

    fn user_form() -> UserForm {
        UserForm {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@example.com".into(),
            password: Some("pass".into()),
            ..UserForm::for_create()
        }
    }

    #[test]
    fn create_requires_password_of_min_length() {
        let mut form = user_form();
        form.password = Some("abc".into());
        let errors = form.check().unwrap_err();
        assert_eq!(errors.field("password"), ["Password must be at least 4 characters long"]);

        form.password = None;
        assert_eq!(form.check().unwrap_err().field("password"), ["Password is required"]);
    }

    #[test]
    fn edit_ignores_password() {
        let mut form = user_form();
        form.id = Some(UserId::new());
        form.password = None;
        assert!(form.check().is_ok());
    }

    #[test]
    fn name_bounds() {
        let mut form = user_form();
        form.first_name = "A".into();
        form.last_name = text(51);
        let errors = form.check().unwrap_err();
        assert!(errors.has("first_name"));
        assert!(errors.has("last_name"));
    }

    #[test]
    fn default_role_prefers_user() {
        let roles = vec![
            Role::new("ADMIN").with_id(RoleId::new()),
            Role::new("USER").with_id(RoleId::new()),
        ];
        assert_eq!(default_role(&roles).map(|r| r.name.as_str()), Some("USER"));
        assert_eq!(default_role(&roles[..1]).map(|r| r.name.as_str()), Some("ADMIN"));
        assert!(default_role(&[]).is_none());
    }

    #[test]
    fn registration_uses_default_role_when_none_selected() {
        let user_role = RoleId::new();
        let roles = vec![Role::new("USER").with_id(user_role)];
        let registration = user_form().into_registration(&roles).unwrap();
        assert_eq!(registration.role_ids, vec![user_role]);
        assert_eq!(registration.password, "pass");
    }

    #[test]
    fn only_admin_mode_changes_roles() {
        let admin = Role::new("ADMIN").with_id(RoleId::new());
        let current = Role::new("USER").with_id(RoleId::new());
        let mut form = user_form();
        form.id = Some(UserId::new());
        form.roles = vec![current.clone()];
        form.selected_role_id = admin.id;
        let available = vec![admin.clone(), current.clone()];

        let user = form.clone().into_update(false, &available).unwrap();
        assert_eq!(user.roles, vec![current]);

        let user = form.into_update(true, &available).unwrap();
        assert_eq!(user.roles, vec![admin]);
    }
}
