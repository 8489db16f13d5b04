use serde::{Deserialize, Serialize};

use crate::readiness::ReadinessGate;

pub const CONNECTION_OK: &str = "Database connection successful";
pub const SCHEMA_OK: &str = "Database schema verified";
pub const CONNECTION_HINT: &str = "Database connection failed. Check your Supabase credentials.";
pub const SCHEMA_HINT: &str = "Database check failed. Make sure the profiles table exists.";

/// ConnectionReport
///
/// Operator-facing outcome of a probe. Success carries the endpoint that answered; failure
/// carries the backend's raw message plus a fixed hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ConnectionReport {
    fn connected(message: &str, url: &str) -> Self {
        Self {
            success: true,
            message: Some(message.to_string()),
            url: Some(url.to_string()),
            error: None,
            details: None,
        }
    }

    fn failed(error: String, hint: &str) -> Self {
        Self {
            success: false,
            message: None,
            url: None,
            error: Some(error),
            details: Some(hint.to_string()),
        }
    }
}

/// ConnectivityProbe
///
/// Issues one minimal read against the profiles table. Diagnostics only; no business
/// logic depends on the result.
#[derive(Clone)]
pub struct ConnectivityProbe {
    gate: ReadinessGate,
}

impl ConnectivityProbe {
    pub fn new(gate: ReadinessGate) -> Self {
        Self { gate }
    }

    pub async fn check_connection(&self) -> ConnectionReport {
        self.run(CONNECTION_OK, CONNECTION_HINT).await
    }

    /// Confirms the profiles table is reachable with the configured key.
    pub async fn verify_schema(&self) -> ConnectionReport {
        self.run(SCHEMA_OK, SCHEMA_HINT).await
    }

    async fn run(&self, ok_message: &str, hint: &str) -> ConnectionReport {
        let backend = self.gate.await_ready().await;
        match backend.probe().await {
            Ok(()) => ConnectionReport::connected(ok_message, backend.endpoint()),
            Err(e) => ConnectionReport::failed(e.to_string(), hint),
        }
    }
}
