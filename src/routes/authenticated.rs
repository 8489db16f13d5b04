use crate::{AppState, guard::route_guard, handlers};
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Everything that operates on a stored session record. The dashboard page is guarded;
/// the actions re-check the session themselves and send anonymous visitors to the login page.
pub fn authenticated_routes() -> Router<AppState> {
    let pages = Router::new()
        // GET /dashboard.html[?check=connection]
        .route("/dashboard.html", get(handlers::dashboard_page))
        .route_layer(middleware::from_fn(route_guard));

    Router::new()
        .merge(pages)
        // POST /profile
        // Dashboard profile form. Remote update first, then merge into the session record.
        .route("/profile", post(handlers::update_profile))
        // POST /logout
        // Logout button. The session record is only cleared once the backend confirms.
        .route("/logout", post(handlers::logout))
}
