//! `blogdesk-client` — typed REST client for the blog backend.
//!
//! Thin: one method per endpoint, JSON in and out, no retries. Status codes
//! are mapped to [`ApiError`] variants so callers can turn a `401`/`403` into
//! a plain message.

pub mod api;
pub mod dto;
pub mod error;

pub use api::{ApiClient, LoginResponse};
pub use dto::{
    BlogPost, BlogPostDraft, BlogPostPage, BlogPostQuery, PAGE_SIZE, SortField, SortOrder, User,
    UserRegistration,
};
pub use error::ApiError;
