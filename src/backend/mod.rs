use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::models::{AuthSession, NewProfile, Profile, ProfilePatch};

pub mod mock;
pub mod supabase;

pub use mock::MockBackend;
pub use supabase::SupabaseClient;

/// Name of the single table the portal reads and writes.
pub const PROFILES_TABLE: &str = "profiles";

/// BackendError
///
/// Failures of a single remote call. `Display` yields the message shown to the member,
/// which for API errors is the backend's own wording.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("unexpected response from backend: {0}")]
    Decode(String),
    #[error("invalid backend configuration: {0}")]
    Config(String),
}

impl BackendError {
    /// Whether the backend rejected the access token itself (expired, revoked or unknown),
    /// i.e. the remote session is already gone.
    pub fn is_session_gone(&self) -> bool {
        matches!(self, BackendError::Api { status: 401 | 403 | 404, .. })
    }
}

// 1. Backend Contract
/// Backend
///
/// The identity and row operations the portal needs from its backend-as-a-service.
/// `SupabaseClient` talks to a hosted project over REST; `MockBackend` keeps everything in
/// memory for tests. Calls that act on behalf of a signed-in member take that member's
/// access token so row-level security applies to them.
#[async_trait]
pub trait Backend: Send + Sync {
    /// The project URL this handle talks to.
    fn endpoint(&self) -> &str;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, BackendError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError>;

    /// Invalidates the remote session identified by `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError>;

    /// Inserts one profile row and returns it as stored.
    async fn insert_profile(
        &self,
        profile: &NewProfile,
        access_token: Option<&str>,
    ) -> Result<Profile, BackendError>;

    /// Every profile row whose id equals `id`. Callers decide what a count other than one means.
    async fn select_profiles(
        &self,
        id: Uuid,
        access_token: Option<&str>,
    ) -> Result<Vec<Profile>, BackendError>;

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        access_token: Option<&str>,
    ) -> Result<(), BackendError>;

    /// Cheapest possible read against the profiles table.
    async fn probe(&self) -> Result<(), BackendError>;
}

/// BackendHandle
///
/// The shared, read-only handle every consumer receives from the readiness gate.
pub type BackendHandle = Arc<dyn Backend>;
