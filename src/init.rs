use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::{
    backend::{BackendHandle, SupabaseClient},
    config::AppConfig,
    credentials,
    probe::ConnectivityProbe,
    readiness::ReadinessGate,
};

/// initialize
///
/// Resolves credentials, constructs the backend client and publishes it on the gate.
/// Construction failures are logged and swallowed: nothing is published, and every
/// consumer waiting on the gate stays suspended. Returns whether a handle was published.
pub fn initialize(config: &AppConfig, gate: &ReadinessGate) -> bool {
    let resolved = credentials::resolve(&config.credentials);

    let client = match SupabaseClient::new(&resolved.credentials) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize backend client");
            return false;
        }
    };

    let handle: BackendHandle = Arc::new(client);
    if !gate.publish(handle) {
        tracing::warn!("Backend client already initialized; ignoring second initialization");
        return false;
    }

    tracing::info!(
        endpoint = %resolved.credentials.url,
        source = ?resolved.source,
        "Backend client initialized"
    );
    true
}

/// spawn_initializer
///
/// Runs [`initialize`] on a background task at startup, then verifies the profiles table
/// once and logs the outcome. Request handlers never wait on this task directly; they wait
/// on the gate.
pub fn spawn_initializer(config: AppConfig, gate: ReadinessGate) -> JoinHandle<()> {
    tokio::spawn(async move {
        if !initialize(&config, &gate) {
            return;
        }

        let report = ConnectivityProbe::new(gate).verify_schema().await;
        if report.success {
            tracing::info!(url = ?report.url, "Database schema verified");
        } else {
            tracing::error!(
                error = ?report.error,
                details = ?report.details,
                "Database check failed"
            );
        }
    })
}
