//! Which controls to show for the signed-in principal.
//!
//! These only hide buttons; the backend enforces the same rules again.

use serde::Serialize;

use blogdesk_auth::{Authority, PermissionGate, PrincipalSource, derive_permissions};
use blogdesk_client::BlogPost;

/// Edit/delete buttons on a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostActions {
    pub can_edit: bool,
    pub can_delete: bool,
}

impl PostActions {
    /// Authors may always edit and delete their own posts. Others need
    /// `BLOGPOST_MODIFY` to edit and `BLOGPOST_DELETE` to delete.
    pub fn for_post<P: PrincipalSource>(gate: &PermissionGate<P>, post: &BlogPost) -> Self {
        let Some(principal) = gate.principal() else {
            return Self::default();
        };
        let permissions = derive_permissions(Some(&principal));
        let is_author = post.author_id().is_some_and(|id| principal.is(id));

        Self {
            can_edit: is_author || permissions.contains(&Authority::BLOGPOST_MODIFY),
            can_delete: is_author || permissions.contains(&Authority::BLOGPOST_DELETE),
        }
    }

    pub fn any(&self) -> bool {
        self.can_edit || self.can_delete
    }
}

/// Which endpoint a write on a post goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PostWriteRoute {
    /// `/blogpost/:id`
    Standard,
    /// `/blogpost/admin/:id`
    Admin,
}

impl PostWriteRoute {
    /// Non-authors holding `BLOGPOST_MODIFY` go through the admin endpoint.
    pub fn for_post<P: PrincipalSource>(gate: &PermissionGate<P>, post: &BlogPost) -> Self {
        let Some(principal) = gate.principal() else {
            return Self::Standard;
        };
        let is_author = post.author_id().is_some_and(|id| principal.is(id));
        if !is_author && derive_permissions(Some(&principal)).contains(&Authority::BLOGPOST_MODIFY) {
            Self::Admin
        } else {
            Self::Standard
        }
    }
}

/// Navigation bar and list page controls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Toolbar {
    pub signed_in: bool,
    pub can_create_post: bool,
    pub show_admin_link: bool,
    /// Role selection on the user page.
    pub user_admin_mode: bool,
}

impl Toolbar {
    pub fn for_gate<P: PrincipalSource>(gate: &PermissionGate<P>) -> Self {
        let Some(principal) = gate.principal() else {
            return Self::default();
        };
        let permissions = derive_permissions(Some(&principal));
        Self {
            signed_in: true,
            can_create_post: permissions.contains(&Authority::BLOGPOST_CREATE),
            show_admin_link: permissions.contains(&Authority::USER_READ),
            user_admin_mode: permissions.contains(&Authority::USER_MODIFY),
        }
    }
}
