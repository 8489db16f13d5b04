use batts_portal::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    init::spawn_initializer,
    readiness::ReadinessGate,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, installs logging, starts the backend initializer in the background
/// and serves the portal. Requests that need the backend wait on the readiness gate.
#[tokio::main]
async fn main() -> std::io::Result<()> {
    // 1. Configuration (.env first, then the process environment)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "batts_portal=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Portal starting in {:?} mode", config.env);

    // 3. Backend client: resolved and published off the request path
    let gate = ReadinessGate::new();
    spawn_initializer(config.clone(), gate.clone());

    // 4. Router and server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(config, gate));

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);

    axum::serve(listener, app).await
}
