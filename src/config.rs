use std::env;

use crate::credentials::CredentialSources;

/// Default listen address for the portal.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the portal's configuration. Loaded once at startup and treated as immutable
/// afterwards; the router reads it when building the session layer.
///
/// Credentials are kept as their unresolved *sources*: resolution happens in the backend
/// initializer, which logs which source won.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Selects the log format.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Enumerated credential inputs (runtime env pair, local file).
    pub credentials: CredentialSources,
    // Marks the session cookie `Secure`. Enabled in production.
    pub secure_cookies: bool,
}

/// Env
///
/// Runtime context. `Local` gets human-readable logs, `Production` gets JSON logs and
/// secure cookies.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Non-panicking configuration with no credential sources at all, so tests never pick up
    /// a developer's real project by accident.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            credentials: CredentialSources::default(),
            secure_cookies: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables (call `dotenv` first to pick up a
    /// `.env` file). Every variable is optional; missing backend credentials degrade to
    /// placeholders later on instead of failing here.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let bind_addr = env::var("BIND_ADDR")
            .ok()
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Self {
            secure_cookies: env == Env::Production,
            env,
            bind_addr,
            credentials: CredentialSources::from_env(),
        }
    }
}
