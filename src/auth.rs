use uuid::Uuid;

use crate::{
    backend::BackendError,
    membership::generate_membership_id,
    models::{NewProfile, Profile, ProfilePatch, Registration},
    readiness::ReadinessGate,
    session::{LocalStorage, SessionError, SessionStore},
};

/// AuthError
///
/// Everything an auth operation can fail with. The `Display` text is what the member sees
/// in the page alert.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("No profile found for this account")]
    ProfileMissing,
    #[error("Expected a single profile for this account, found {0}")]
    ProfileAmbiguous(usize),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// AuthService
///
/// Registration, login, logout and profile updates against the backend. Every operation
/// first waits on the readiness gate, owns its own error boundary (failures are logged here
/// and returned, never retried) and leaves the session store untouched when it fails.
///
/// The service is shared across requests; the per-browser storage is passed in per call.
#[derive(Clone)]
pub struct AuthService {
    gate: ReadinessGate,
}

impl AuthService {
    pub fn new(gate: ReadinessGate) -> Self {
        Self { gate }
    }

    /// register
    ///
    /// Creates the identity, then the profile row with a freshly generated membership id and
    /// status "Pending Approval". The first failing step aborts the rest.
    pub async fn register(&self, registration: Registration) -> Result<Profile, AuthError> {
        let result = self.try_register(&registration).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, email = %registration.email, "Registration error");
        }
        result
    }

    async fn try_register(&self, registration: &Registration) -> Result<Profile, AuthError> {
        let backend = self.gate.await_ready().await;
        let membership_id = generate_membership_id(registration.membership_type);

        let session = backend
            .sign_up(&registration.email, &registration.password)
            .await?;

        let row = NewProfile::pending(session.user.id, registration, membership_id);
        let profile = backend
            .insert_profile(&row, session.access_token.as_deref())
            .await?;

        tracing::info!(
            member = %profile.id,
            membership_id = %profile.membership_id,
            "Member registered"
        );
        Ok(profile)
    }

    /// login
    ///
    /// Signs in, loads the member's single profile row and caches it (with the access token)
    /// in the session store. Nothing is written to the store unless every step succeeds.
    pub async fn login(
        &self,
        storage: &dyn LocalStorage,
        email: &str,
        password: &str,
    ) -> Result<Profile, AuthError> {
        let result = self.try_login(storage, email, password).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, email = %email, "Login error");
        }
        result
    }

    async fn try_login(
        &self,
        storage: &dyn LocalStorage,
        email: &str,
        password: &str,
    ) -> Result<Profile, AuthError> {
        let backend = self.gate.await_ready().await;

        let session = backend.sign_in_with_password(email, password).await?;
        let token = session.access_token.as_deref();

        let mut rows = backend.select_profiles(session.user.id, token).await?;
        let profile = match rows.len() {
            0 => return Err(AuthError::ProfileMissing),
            1 => rows.remove(0),
            n => return Err(AuthError::ProfileAmbiguous(n)),
        };

        let store = SessionStore::new(storage);
        store.save_user(&profile).await?;
        store.save_access_token(token).await?;

        tracing::info!(member = %profile.id, "Member logged in");
        Ok(profile)
    }

    /// logout
    ///
    /// Invalidates the remote session, then clears the session store. A remote failure
    /// leaves the stored record in place, except when the backend reports the token as
    /// already invalid (expired or revoked). Without a stored access token there is no
    /// remote session to invalidate.
    pub async fn logout(&self, storage: &dyn LocalStorage) -> Result<(), AuthError> {
        let result = self.try_logout(storage).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "Logout error");
        }
        result
    }

    async fn try_logout(&self, storage: &dyn LocalStorage) -> Result<(), AuthError> {
        let backend = self.gate.await_ready().await;
        let store = SessionStore::new(storage);

        if let Some(token) = store.access_token().await? {
            match backend.sign_out(&token).await {
                Ok(()) => {}
                Err(e) if e.is_session_gone() => {
                    tracing::warn!(error = %e, "Remote session already ended; clearing locally");
                }
                Err(e) => return Err(e.into()),
            }
        }

        store.clear().await?;
        Ok(())
    }

    /// update_profile
    ///
    /// Writes the patch to the remote row, then merges it field by field into the cached
    /// record. There is no check against concurrent remote edits; the last write wins.
    pub async fn update_profile(
        &self,
        storage: &dyn LocalStorage,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), AuthError> {
        let result = self.try_update_profile(storage, id, patch).await;
        if let Err(e) = &result {
            tracing::error!(error = %e, member = %id, "Profile update error");
        }
        result
    }

    async fn try_update_profile(
        &self,
        storage: &dyn LocalStorage,
        id: Uuid,
        patch: &ProfilePatch,
    ) -> Result<(), AuthError> {
        let backend = self.gate.await_ready().await;
        let store = SessionStore::new(storage);
        let token = store.access_token().await?;

        backend.update_profile(id, patch, token.as_deref()).await?;

        if let Some(mut cached) = store.current_user().await? {
            cached.apply(patch);
            store.save_user(&cached).await?;
        }
        Ok(())
    }

    /// The cached session record. Local read only.
    ///
    /// A record that no longer parses is removed and reported as no session.
    pub async fn current_user(
        &self,
        storage: &dyn LocalStorage,
    ) -> Result<Option<Profile>, AuthError> {
        let store = SessionStore::new(storage);
        match store.current_user().await {
            Ok(user) => Ok(user),
            Err(SessionError::Corrupt(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                store.clear().await?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn is_logged_in(&self, storage: &dyn LocalStorage) -> Result<bool, AuthError> {
        Ok(SessionStore::new(storage).is_logged_in().await?)
    }
}
