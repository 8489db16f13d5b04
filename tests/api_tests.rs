use batts_portal::{
    AppConfig, AppState, MockBackend, ReadinessGate, create_router,
    credentials::{CredentialSources, Credentials},
    init::initialize,
    probe::ConnectionReport,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub gate: ReadinessGate,
}

/// Serves the portal on an ephemeral port. The gate is returned unpublished so tests can
/// decide when (and whether) the backend becomes ready.
async fn spawn_app() -> TestApp {
    let gate = ReadinessGate::new();
    let state = AppState::new(AppConfig::default(), gate.clone());
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp { address, gate }
}

#[tokio::test]
async fn test_health_check_does_not_wait_for_backend() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert!(!app.gate.is_ready());
}

#[tokio::test]
async fn test_requests_wait_for_late_initialization() {
    let app = spawn_app().await;
    let client = reqwest::Client::new();

    let pending = tokio::spawn({
        let url = format!("{}/api/connection", app.address);
        async move { client.get(url).send().await.expect("req fail") }
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!pending.is_finished());

    app.gate.publish(Arc::new(MockBackend::new()));

    let response = pending.await.unwrap();
    assert_eq!(response.status(), 200);
    let report: ConnectionReport = response.json().await.unwrap();
    assert!(report.success);
}

#[tokio::test]
async fn test_initializer_feeds_running_server() {
    let app = spawn_app().await;
    let config = AppConfig {
        credentials: CredentialSources {
            injected: Some(Credentials::new("https://abc.supabase.co", "anon-key")),
            local_file: None,
        },
        ..AppConfig::default()
    };

    assert!(initialize(&config, &app.gate));
    assert_eq!(
        app.gate.try_get().unwrap().endpoint(),
        "https://abc.supabase.co"
    );

    // Pages render once the backend is published; no network call is needed for them.
    let response = reqwest::get(format!("{}/login.html", app.address))
        .await
        .expect("req fail");
    assert_eq!(response.status(), 200);
}
