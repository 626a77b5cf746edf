//! `blogdesk-app` — the application layer.
//!
//! Route table and guards, form validation, which buttons to show, and the
//! [`AppContext`] that ties the REST client to the persisted session and the
//! permission gate.

pub mod actions;
pub mod config;
pub mod context;
pub mod forms;
pub mod routes;

pub use actions::{PostActions, PostWriteRoute, Toolbar};
pub use config::{AppConfig, ConfigError};
pub use context::{AppContext, AppError};
pub use forms::{BlogPostForm, FormErrors, LoginForm, UserForm};
pub use routes::{Navigation, Route};
