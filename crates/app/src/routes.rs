//! Route table.
//!
//! | path                  | requirement       |
//! |-----------------------|-------------------|
//! | `/`                   | public            |
//! | `/login`              | public            |
//! | `/admin`              | `USER_READ`       |
//! | `/user`               | `USER_READ`       |
//! | `/user/edit`          | `USER_CREATE`     |
//! | `/user/edit/:userId`  | `USER_CREATE`     |
//! | `/blogpost/create`    | `BLOGPOST_CREATE` |
//! | `/blogpost/:id`       | public            |
//! | `/blogpost/edit/:id`  | `BLOGPOST_MODIFY` |
//! | `/unauthorized`       | public            |

use blogdesk_auth::{Authority, GuardDecision, PermissionGate, PrincipalSource, Requirement, guard};
use blogdesk_core::{BlogPostId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Post list.
    Home,
    Login,
    Admin,
    UserList,
    UserCreate,
    UserEdit(UserId),
    BlogPostCreate,
    BlogPostDetail(BlogPostId),
    BlogPostEdit(BlogPostId),
    Unauthorized,
    NotFound,
}

impl Route {
    /// Match a path. Query string, fragment and trailing slashes are ignored;
    /// anything unknown (including malformed ids) is `NotFound`.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Self::Home,
            ["login"] => Self::Login,
            ["admin"] => Self::Admin,
            ["user"] => Self::UserList,
            ["user", "edit"] => Self::UserCreate,
            ["user", "edit", id] => id.parse().map(Self::UserEdit).unwrap_or(Self::NotFound),
            ["blogpost", "create"] => Self::BlogPostCreate,
            ["blogpost", "edit", id] => id.parse().map(Self::BlogPostEdit).unwrap_or(Self::NotFound),
            ["blogpost", id] => id.parse().map(Self::BlogPostDetail).unwrap_or(Self::NotFound),
            ["unauthorized"] => Self::Unauthorized,
            _ => Self::NotFound,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Admin => "/admin".to_string(),
            Self::UserList => "/user".to_string(),
            Self::UserCreate => "/user/edit".to_string(),
            Self::UserEdit(id) => format!("/user/edit/{id}"),
            Self::BlogPostCreate => "/blogpost/create".to_string(),
            Self::BlogPostDetail(id) => format!("/blogpost/{id}"),
            Self::BlogPostEdit(id) => format!("/blogpost/edit/{id}"),
            Self::Unauthorized => "/unauthorized".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    pub fn requirement(&self) -> Requirement {
        match self {
            Self::Admin | Self::UserList => Requirement::authority(Authority::USER_READ),
            Self::UserCreate | Self::UserEdit(_) => Requirement::authority(Authority::USER_CREATE),
            Self::BlogPostCreate => Requirement::authority(Authority::BLOGPOST_CREATE),
            Self::BlogPostEdit(_) => Requirement::authority(Authority::BLOGPOST_MODIFY),
            Self::Home
            | Self::Login
            | Self::BlogPostDetail(_)
            | Self::Unauthorized
            | Self::NotFound => Requirement::Public,
        }
    }
}

impl core::fmt::Display for Route {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.path())
    }
}

/// Where a navigation ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { from: Route, to: Route },
}

impl Navigation {
    /// The route that is finally shown.
    pub fn target(&self) -> Route {
        match self {
            Self::Render(route) => *route,
            Self::Redirect { to, .. } => *to,
        }
    }
}

/// Resolve a path against the route table and the gate.
pub fn resolve<P: PrincipalSource>(gate: &PermissionGate<P>, path: &str) -> Navigation {
    let route = Route::parse(path);
    match guard(gate, &route.requirement()) {
        GuardDecision::Render => Navigation::Render(route),
        GuardDecision::RedirectToLogin => Navigation::Redirect {
            from: route,
            to: Route::Login,
        },
        GuardDecision::Unauthorized => Navigation::Redirect {
            from: route,
            to: Route::Unauthorized,
        },
    }
}
