use crate::{AppState, guard::route_guard, handlers};
use axum::{
    Router, middleware,
    routing::{get, post},
};

/// Public Router Module
///
/// Pages any visitor may open, and the form actions behind them. The login and register
/// pages still pass through the route guard, which forwards members that already have a
/// session to the dashboard.
pub fn public_routes() -> Router<AppState> {
    let pages = Router::new()
        .route("/", get(handlers::index_page))
        .route("/index.html", get(handlers::index_page))
        .route("/register.html", get(handlers::register_page))
        .route("/login.html", get(handlers::login_page))
        .route_layer(middleware::from_fn(route_guard));

    Router::new()
        .merge(pages)
        // POST /register
        // Registration form. Creates the identity and the pending profile row.
        .route("/register", post(handlers::register))
        // POST /login
        // Login form. Caches the profile in the visitor's session on success.
        .route("/login", post(handlers::login))
        // GET /health
        // Liveness only; does not wait for the backend.
        .route("/health", get(|| async { "ok" }))
        // GET /api/connection
        // Operator diagnostics: one minimal read against the profiles table.
        .route("/api/connection", get(handlers::connection_status))
}
