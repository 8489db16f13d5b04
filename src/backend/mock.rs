use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard, PoisonError},
};
use uuid::Uuid;

use super::{Backend, BackendError};
use crate::models::{AuthSession, AuthUser, NewProfile, Profile, ProfilePatch};

const MOCK_ENDPOINT: &str = "http://mock-backend.local";

// 3. The Mock Implementation (For Tests)
/// MockBackend
///
/// In-memory stand-in for the hosted project. Identities, profile rows and issued access
/// tokens live behind a mutex; individual operations can be switched to fail so tests can
/// exercise every error path of the auth service without a network.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    // email -> (password, identity id)
    identities: HashMap<String, (String, Uuid)>,
    profiles: Vec<Profile>,
    active_tokens: Vec<String>,
    fail_sign_out: bool,
    expired_sign_out: bool,
    fail_insert: bool,
    fail_update: bool,
    fail_probe: bool,
}

fn rejected(status: u16, message: &str) -> BackendError {
    BackendError::Api {
        status,
        message: message.to_string(),
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an identity together with the profile row that belongs to it.
    pub fn with_member(self, password: &str, profile: Profile) -> Self {
        {
            let mut state = self.lock();
            state
                .identities
                .insert(profile.email.clone(), (password.to_string(), profile.id));
            state.profiles.push(profile);
        }
        self
    }

    /// Seeds an identity that has no profile row.
    pub fn with_identity(self, email: &str, password: &str) -> Self {
        self.lock()
            .identities
            .insert(email.to_string(), (password.to_string(), Uuid::new_v4()));
        self
    }

    /// Adds a raw row without an identity, e.g. to simulate duplicated profile rows.
    pub fn with_profile_row(self, profile: Profile) -> Self {
        self.lock().profiles.push(profile);
        self
    }

    pub fn failing_sign_out(self) -> Self {
        self.lock().fail_sign_out = true;
        self
    }

    /// Sign-out answers 401, as the hosted project does once an access token has expired.
    pub fn expired_sign_out(self) -> Self {
        self.lock().expired_sign_out = true;
        self
    }

    pub fn failing_insert(self) -> Self {
        self.lock().fail_insert = true;
        self
    }

    pub fn failing_update(self) -> Self {
        self.lock().fail_update = true;
        self
    }

    pub fn failing_probe(self) -> Self {
        self.lock().fail_probe = true;
        self
    }

    /// Snapshot of the stored row for `id`, for assertions.
    pub fn profile(&self, id: Uuid) -> Option<Profile> {
        self.lock().profiles.iter().find(|p| p.id == id).cloned()
    }

    pub fn is_token_active(&self, token: &str) -> bool {
        self.lock().active_tokens.iter().any(|t| t == token)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_token(state: &mut MockState, id: Uuid) -> String {
        let token = format!("mock-token-{id}-{}", state.active_tokens.len());
        state.active_tokens.push(token.clone());
        token
    }
}

#[async_trait]
impl Backend for MockBackend {
    fn endpoint(&self) -> &str {
        MOCK_ENDPOINT
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        let mut state = self.lock();
        if state.identities.contains_key(email) {
            return Err(rejected(422, "User already registered"));
        }

        let id = Uuid::new_v4();
        state
            .identities
            .insert(email.to_string(), (password.to_string(), id));
        let token = Self::issue_token(&mut state, id);

        Ok(AuthSession {
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
            access_token: Some(token),
        })
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let mut state = self.lock();
        let id = match state.identities.get(email) {
            Some((stored, id)) if stored == password => *id,
            _ => return Err(rejected(400, "Invalid login credentials")),
        };
        let token = Self::issue_token(&mut state, id);

        Ok(AuthSession {
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
            access_token: Some(token),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.fail_sign_out {
            return Err(rejected(503, "Service unavailable"));
        }
        if state.expired_sign_out {
            return Err(rejected(
                401,
                "invalid JWT: unable to parse or verify signature, token is expired",
            ));
        }
        state.active_tokens.retain(|t| t != access_token);
        Ok(())
    }

    async fn insert_profile(
        &self,
        profile: &NewProfile,
        _access_token: Option<&str>,
    ) -> Result<Profile, BackendError> {
        let mut state = self.lock();
        if state.fail_insert {
            return Err(rejected(403, "new row violates row-level security policy"));
        }
        if state
            .profiles
            .iter()
            .any(|p| p.membership_id == profile.membership_id || p.email == profile.email)
        {
            return Err(rejected(409, "duplicate key value violates unique constraint"));
        }

        let now = chrono::Utc::now();
        let row = Profile {
            id: profile.id,
            full_name: profile.full_name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            membership_type: profile.membership_type,
            membership_id: profile.membership_id.clone(),
            status: profile.status.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        state.profiles.push(row.clone());
        Ok(row)
    }

    async fn select_profiles(
        &self,
        id: Uuid,
        _access_token: Option<&str>,
    ) -> Result<Vec<Profile>, BackendError> {
        Ok(self
            .lock()
            .profiles
            .iter()
            .filter(|p| p.id == id)
            .cloned()
            .collect())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        _access_token: Option<&str>,
    ) -> Result<(), BackendError> {
        let mut state = self.lock();
        if state.fail_update {
            return Err(rejected(500, "update failed"));
        }
        for row in state.profiles.iter_mut().filter(|p| p.id == id) {
            row.apply(patch);
            row.updated_at = Some(chrono::Utc::now());
        }
        Ok(())
    }

    async fn probe(&self) -> Result<(), BackendError> {
        if self.lock().fail_probe {
            return Err(rejected(401, "Invalid API key"));
        }
        Ok(())
    }
}
