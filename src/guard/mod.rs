//! Authorization check run before rendering a protected view.
//!
//! The decision is a pure function of the session's user and the role the
//! view requires, so it can be tested without any HTTP machinery. The axum
//! middleware in `ui::admin` applies it to the `/admin` tree.

use crate::models::User;

pub const HOME_ROUTE: &str = "/";
pub const LOGIN_ROUTE: &str = "/login";
pub const ADMIN_ROUTE: &str = "/admin";

/// Role a protected view demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredRole {
    /// Any authenticated user
    Authenticated,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Redirect(&'static str),
}

pub fn authorize(user: Option<&User>, required: RequiredRole) -> Access {
    match (user, required) {
        (None, _) => Access::Redirect(LOGIN_ROUTE),
        (Some(_), RequiredRole::Authenticated) => Access::Allow,
        (Some(user), RequiredRole::Admin) if user.role.is_admin() => Access::Allow,
        (Some(_), RequiredRole::Admin) => Access::Redirect(HOME_ROUTE),
    }
}
