use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

/// Endpoint used when no credentials are configured. Requests against it fail, which is how
/// a missing configuration eventually surfaces.
pub const PLACEHOLDER_URL: &str = "https://your-supabase-url.supabase.co";
pub const PLACEHOLDER_KEY: &str = "your-supabase-anon-key";

/// Default location of the untracked developer config (see `supabase-config.template.json`).
pub const DEFAULT_LOCAL_CONFIG: &str = "supabase-config.local.json";

/// Credentials
///
/// Connection parameters for the backend project: the project URL and the public
/// (anon) API key. The JSON field names match the local config file layout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    #[serde(rename = "SUPABASE_URL")]
    pub url: String,
    #[serde(rename = "SUPABASE_KEY")]
    pub key: String,
}

impl Credentials {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_URL, PLACEHOLDER_KEY)
    }

    fn is_complete(&self) -> bool {
        !self.url.trim().is_empty() && !self.key.trim().is_empty()
    }
}

/// Where the resolved credentials came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Injected,
    LocalFile,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCredentials {
    pub credentials: Credentials,
    pub source: CredentialSource,
}

/// CredentialSources
///
/// The enumerated inputs of the resolver, captured once at startup so resolution itself
/// never touches ambient state.
#[derive(Debug, Clone, Default)]
pub struct CredentialSources {
    /// Runtime-injected pair (`SUPABASE_URL` / `SUPABASE_KEY`). Either half may be empty.
    pub injected: Option<Credentials>,
    /// Path of the optional untracked config file.
    pub local_file: Option<PathBuf>,
}

impl CredentialSources {
    /// Reads the injected pair and the local file location from the process environment.
    pub fn from_env() -> Self {
        let url = env::var("SUPABASE_URL").ok();
        let key = env::var("SUPABASE_KEY").ok();
        let injected = match (url, key) {
            (None, None) => None,
            (url, key) => Some(Credentials::new(
                url.unwrap_or_default(),
                key.unwrap_or_default(),
            )),
        };

        let local_file = env::var("BATTS_LOCAL_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOCAL_CONFIG));

        Self {
            injected,
            local_file: Some(local_file),
        }
    }
}

/// resolve
///
/// Picks the connection parameters: a complete injected pair first, then the local config
/// file, then placeholders. Never fails and never touches the network.
pub fn resolve(sources: &CredentialSources) -> ResolvedCredentials {
    if let Some(injected) = sources.injected.as_ref().filter(|c| c.is_complete()) {
        tracing::info!("Using backend credentials from the runtime environment");
        return ResolvedCredentials {
            credentials: injected.clone(),
            source: CredentialSource::Injected,
        };
    }

    if let Some(credentials) = sources.local_file.as_deref().and_then(read_local_file) {
        tracing::info!("Using backend credentials from the local config file");
        return ResolvedCredentials {
            credentials,
            source: CredentialSource::LocalFile,
        };
    }

    tracing::warn!("No valid backend credentials found. Using placeholder values.");
    tracing::warn!("Set SUPABASE_URL and SUPABASE_KEY for the portal to work.");
    ResolvedCredentials {
        credentials: Credentials::placeholder(),
        source: CredentialSource::Placeholder,
    }
}

fn read_local_file(path: &Path) -> Option<Credentials> {
    if !path.exists() {
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Local backend config unreadable");
            return None;
        }
    };

    match serde_json::from_str::<Credentials>(&contents) {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Local backend config invalid");
            None
        }
    }
}
