use askama::Template;
use askama_web::WebTemplate;
use std::time::Duration;

use crate::{
    models::{MembershipType, Profile, STATUS_APPROVED, STATUS_PENDING_APPROVAL},
    probe::ConnectionReport,
};

// --- Alerts & Redirects ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Error,
}

impl AlertKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            AlertKind::Success => "alert-success",
            AlertKind::Error => "alert-danger",
        }
    }
}

/// Alert
///
/// Inline status text rendered into the element with id `element_id`. The base layout
/// hides alerts after a few seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
    pub element_id: &'static str,
}

impl Alert {
    pub fn success(element_id: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
            element_id,
        }
    }

    pub fn error(element_id: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
            element_id,
        }
    }
}

/// A client-side redirect that fires after `delay`, rendered as a `refresh` meta tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedRedirect {
    pub target: &'static str,
    pub delay: Duration,
}

impl DelayedRedirect {
    pub fn new(target: &'static str, delay: Duration) -> Self {
        Self { target, delay }
    }

    /// Delay in seconds as the `refresh` header expects it (`1.5`, `3`).
    pub fn seconds(&self) -> String {
        let secs = self.delay.as_secs_f64();
        if secs.fract() == 0.0 {
            format!("{secs:.0}")
        } else {
            format!("{secs}")
        }
    }
}

// --- Pages ---

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub logged_in: bool,
}

/// Registration inputs rendered back into the form after a rejected submission.
/// Passwords are never echoed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterValues {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub membership_type: Option<MembershipType>,
}

impl RegisterValues {
    /// Whether the membership radio with this value should be checked.
    pub fn is_selected(&self, value: &str) -> bool {
        self.membership_type.is_some_and(|t| t.as_str() == value)
    }
}

#[derive(Template, WebTemplate, Default)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub alert: Option<Alert>,
    pub redirect: Option<DelayedRedirect>,
    pub values: RegisterValues,
}

#[derive(Template, WebTemplate, Default)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub alert: Option<Alert>,
    pub redirect: Option<DelayedRedirect>,
    // Prefill after a failed attempt.
    pub email: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub view: DashboardView,
    pub alert: Option<Alert>,
    pub connection: Option<ConnectionReport>,
}

/// DashboardView
///
/// The text shown in each dashboard element, with the fallbacks applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub user_name: String,
    pub membership_id: String,
    pub detail_name: String,
    pub detail_email: String,
    pub detail_phone: String,
    pub detail_type: String,
    pub detail_status: String,
    pub status_class: Option<&'static str>,
    // Prefill for the profile form.
    pub full_name_value: String,
    pub phone_value: String,
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

impl DashboardView {
    pub fn from_profile(user: &Profile) -> Self {
        let phone = user.phone.as_deref().unwrap_or_default();
        let status_class = match user.status.as_str() {
            STATUS_APPROVED => Some("status-approved"),
            STATUS_PENDING_APPROVAL => Some("status-pending"),
            _ => None,
        };

        Self {
            user_name: or_default(&user.full_name, "Member"),
            membership_id: or_default(&user.membership_id, "Not assigned"),
            detail_name: or_default(&user.full_name, "Not provided"),
            detail_email: or_default(&user.email, "Not provided"),
            detail_phone: or_default(phone, "Not provided"),
            detail_type: or_default(user.membership_type.as_str(), "Not specified"),
            detail_status: or_default(&user.status, "Pending"),
            status_class,
            full_name_value: user.full_name.clone(),
            phone_value: phone.to_string(),
        }
    }
}
