use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status written for every new registration. Approval happens outside the portal.
pub const STATUS_PENDING_APPROVAL: &str = "Pending Approval";
/// Status an administrator sets once the membership is accepted.
pub const STATUS_APPROVED: &str = "Approved";

// --- Core Schemas (Mapped to the `profiles` table) ---

/// MembershipType
///
/// The two membership tiers offered at registration. Serialized exactly as the
/// radio-button values (`Junior` / `Senior`) so the form, the table and the session
/// record all agree on the spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipType {
    Junior,
    Senior,
}

impl MembershipType {
    /// Two-letter prefix used by generated membership ids.
    pub fn id_prefix(self) -> &'static str {
        match self {
            MembershipType::Junior => "JR",
            MembershipType::Senior => "SR",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MembershipType::Junior => "Junior",
            MembershipType::Senior => "Senior",
        }
    }
}

/// Profile
///
/// A row of the `profiles` table. The `id` is the identity id issued by the auth service,
/// which keeps the two systems keyed identically. This is also the shape cached in the
/// session record after login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub membership_type: MembershipType,
    pub membership_id: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Profile {
    /// Shallow merge: every field present in the patch overwrites the cached value.
    pub fn apply(&mut self, patch: &ProfilePatch) {
        if let Some(full_name) = &patch.full_name {
            self.full_name = full_name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(membership_type) = patch.membership_type {
            self.membership_type = membership_type;
        }
    }
}

/// NewProfile
///
/// Insert payload for a freshly registered member. `status` is always
/// [`STATUS_PENDING_APPROVAL`] when built through [`NewProfile::pending`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub membership_type: MembershipType,
    pub membership_id: String,
    pub status: String,
}

impl NewProfile {
    pub fn pending(id: Uuid, registration: &Registration, membership_id: String) -> Self {
        Self {
            id,
            full_name: registration.full_name.clone(),
            email: registration.email.clone(),
            phone: registration.phone.clone(),
            membership_type: registration.membership_type,
            membership_id,
            status: STATUS_PENDING_APPROVAL.to_string(),
        }
    }
}

/// ProfilePatch
///
/// Partial update payload. Only the fields that are `Some` are sent to the backend and
/// merged into the cached session record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub membership_type: Option<MembershipType>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.membership_type.is_none()
    }
}

// --- Identity Schemas ---

/// Registration
///
/// Everything the registration form collects once it has passed the local checks.
/// The password is handed to the auth service and never stored by the portal.
#[derive(Debug, Clone)]
pub struct Registration {
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
    pub membership_type: MembershipType,
}

/// The identity half of an auth response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// AuthSession
///
/// Result of a sign-up or sign-in. Sign-up only carries an access token when the project
/// confirms new identities automatically.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSession {
    pub user: AuthUser,
    pub access_token: Option<String>,
}
