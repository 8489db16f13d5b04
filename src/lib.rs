use axum::{Router, extract::FromRef, http::HeaderName};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tower_sessions::{MemoryStore, SessionManagerLayer, cookie::SameSite};
use tracing::{Level, Span};

// --- Module Structure ---

// Startup: configuration, credential resolution, backend construction and readiness.
pub mod config;
pub mod credentials;
pub mod init;
pub mod readiness;

// Backend access and the services built on it.
pub mod auth;
pub mod backend;
pub mod membership;
pub mod models;
pub mod probe;
pub mod session;

// HTTP surface: route guard, page controllers, templates, routers.
pub mod guard;
pub mod handlers;
pub mod routes;
pub mod views;

use routes::{authenticated, public};

// --- Public Re-exports ---

pub use auth::{AuthError, AuthService};
pub use backend::{Backend, BackendError, BackendHandle, MockBackend, SupabaseClient};
pub use config::AppConfig;
pub use probe::ConnectivityProbe;
pub use readiness::ReadinessGate;

/// Name of the cookie that binds a browser to its session storage.
pub const SESSION_COOKIE_NAME: &str = "batts_session";

/// AppState
///
/// Everything the request handlers share. The backend handle itself is not a field: it is
/// reached through the readiness gate, which every service holds a clone of, so handlers can
/// run before initialization has finished and simply wait.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub probe: ConnectivityProbe,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, gate: ReadinessGate) -> Self {
        Self {
            auth: AuthService::new(gate.clone()),
            probe: ConnectivityProbe::new(gate),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AuthService {
    fn from_ref(app_state: &AppState) -> AuthService {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for ConnectivityProbe {
    fn from_ref(app_state: &AppState) -> ConnectivityProbe {
        app_state.probe.clone()
    }
}

/// create_router
///
/// Assembles the page and action routes, the per-browser session layer and the
/// observability layers.
pub fn create_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/");

    let x_request_id = HeaderName::from_static("x-request-id");

    Router::new()
        .merge(public::public_routes())
        .merge(authenticated::authenticated_routes())
        .with_state(state)
        .layer(session_layer)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` set by the outer layer so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
