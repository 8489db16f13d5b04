use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::session::SessionStore;

pub const LOGIN_PAGE: &str = "/login.html";
pub const REGISTER_PAGE: &str = "/register.html";
pub const DASHBOARD_PAGE: &str = "/dashboard.html";
pub const INDEX_PAGE: &str = "/index.html";

/// Pages reachable without a session.
pub const PUBLIC_ROUTES: [&str; 4] = [INDEX_PAGE, LOGIN_PAGE, REGISTER_PAGE, "/"];

/// Whether `path` ends with one of the public routes.
pub fn is_public(path: &str) -> bool {
    PUBLIC_ROUTES.iter().any(|route| path.ends_with(route))
}

/// decide
///
/// Where a page load should be redirected, if anywhere:
/// protected pages send anonymous visitors to the login page, and the login/register pages
/// send members with a session to the dashboard. Everything else is left alone.
pub fn decide(path: &str, logged_in: bool) -> Option<&'static str> {
    if !is_public(path) && !logged_in {
        Some(LOGIN_PAGE)
    } else if path.ends_with(DASHBOARD_PAGE) && !logged_in {
        Some(LOGIN_PAGE)
    } else if (path.ends_with(LOGIN_PAGE) || path.ends_with(REGISTER_PAGE)) && logged_in {
        Some(DASHBOARD_PAGE)
    } else {
        None
    }
}

/// route_guard
///
/// Middleware wrapped around the page routes. Reads the visitor's session once and applies
/// [`decide`]. A session that cannot be read is treated as no session.
pub async fn route_guard(session: Session, request: Request, next: Next) -> Response {
    let logged_in = match SessionStore::new(&session).is_logged_in().await {
        Ok(logged_in) => logged_in,
        Err(e) => {
            tracing::warn!(error = %e, "Session unreadable in route guard");
            false
        }
    };

    let path = request.uri().path().to_string();
    match decide(&path, logged_in) {
        Some(target) => {
            tracing::debug!(%path, %target, "Route guard redirect");
            Redirect::to(target).into_response()
        }
        None => next.run(request).await,
    }
}
