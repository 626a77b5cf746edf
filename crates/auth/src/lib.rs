//! `blogdesk-auth` — client-side authorization gate.
//!
//! Answers "may the signed-in user do X" from the locally persisted principal
//! record, without a network round trip. This is a UX convenience only: the
//! backend remains the authority and re-checks every request.
//!
//! This crate is intentionally decoupled from HTTP.

pub mod authority;
pub mod gate;
pub mod guard;
mod lenient;
pub mod principal;
pub mod roles;
pub mod session;

pub use authority::Authority;
pub use gate::{
    PermissionGate, PermissionSet, PrincipalSource, derive_permissions, has_all_authorities,
    has_any_authority, has_authority,
};
pub use guard::{GuardDecision, GuardExplanation, Requirement, explain, guard};
pub use principal::Principal;
pub use roles::{AuthorityGrant, Role};
pub use session::{FileStore, KeyValueStore, MemoryStore, SessionStore, StoreError};
