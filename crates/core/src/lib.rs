//! `blogdesk-core` — shared building blocks.
//!
//! Identifiers and the domain error model used by every other crate. No I/O.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{AuthorityId, BlogPostId, RoleId, UserId};
