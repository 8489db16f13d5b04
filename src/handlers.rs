use axum::{
    Form, Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use std::time::Duration;
use tower_sessions::Session;

use crate::{
    auth::AuthService,
    guard::{DASHBOARD_PAGE, INDEX_PAGE, LOGIN_PAGE},
    models::{MembershipType, ProfilePatch, Registration},
    probe::{ConnectionReport, ConnectivityProbe},
    views::{
        Alert, DashboardTemplate, DashboardView, DelayedRedirect, IndexTemplate, LoginTemplate,
        RegisterTemplate, RegisterValues,
    },
};

const REGISTER_REDIRECT_DELAY: Duration = Duration::from_millis(3000);
const LOGIN_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

// --- Form Payloads ---

/// RegisterForm
///
/// Field names follow the registration form's input names. An unchecked membership radio
/// group is simply absent from the submission.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    #[serde(rename = "membershipType", default)]
    pub membership_type: Option<MembershipType>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl ProfileForm {
    /// Blank inputs mean "leave unchanged".
    fn into_patch(self) -> ProfilePatch {
        let keep = |value: Option<String>| value.filter(|v| !v.trim().is_empty());
        ProfilePatch {
            full_name: keep(self.full_name),
            phone: keep(self.phone),
            ..ProfilePatch::default()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub check: Option<String>,
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// --- Page Controllers ---

/// [Public Page] Landing page.
pub async fn index_page(State(auth): State<AuthService>, session: Session) -> IndexTemplate {
    let logged_in = auth.is_logged_in(&session).await.unwrap_or(false);
    IndexTemplate { logged_in }
}

pub async fn register_page() -> RegisterTemplate {
    RegisterTemplate::default()
}

/// register
///
/// [Form Handler] Runs the two local checks (matching passwords, chosen membership type),
/// then the registration. On success the page thanks the member and sends them to the login
/// page after a short delay; on any failure the form keeps what was typed, minus passwords.
pub async fn register(
    State(auth): State<AuthService>,
    Form(form): Form<RegisterForm>,
) -> RegisterTemplate {
    let values = RegisterValues {
        full_name: form.full_name.clone(),
        email: form.email.clone(),
        phone: form.phone.clone(),
        membership_type: form.membership_type,
    };

    if form.password != form.confirm_password {
        return rejected_registration(values, "Passwords do not match");
    }

    let Some(membership_type) = form.membership_type else {
        return rejected_registration(values, "Please select a membership type");
    };

    let registration = Registration {
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: non_empty(form.phone),
        password: form.password,
        membership_type,
    };

    match auth.register(registration).await {
        Ok(_) => RegisterTemplate {
            alert: Some(Alert::success(
                "register-success",
                "Thank you, your membership will be approved shortly.",
            )),
            redirect: Some(DelayedRedirect::new(LOGIN_PAGE, REGISTER_REDIRECT_DELAY)),
            values: RegisterValues::default(),
        },
        Err(e) => rejected_registration(
            values,
            message_or(e.to_string(), "Registration failed. Please try again."),
        ),
    }
}

fn rejected_registration(values: RegisterValues, message: impl Into<String>) -> RegisterTemplate {
    RegisterTemplate {
        alert: Some(Alert::error("register-error", message)),
        redirect: None,
        values,
    }
}

pub async fn login_page() -> LoginTemplate {
    LoginTemplate::default()
}

/// [Form Handler] Logs the member in and forwards to the dashboard after a short delay.
pub async fn login(
    State(auth): State<AuthService>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> LoginTemplate {
    match auth
        .login(&session, form.email.trim(), &form.password)
        .await
    {
        Ok(_) => LoginTemplate {
            alert: Some(Alert::success(
                "login-success",
                "You are logged in successfully!",
            )),
            redirect: Some(DelayedRedirect::new(DASHBOARD_PAGE, LOGIN_REDIRECT_DELAY)),
            email: String::new(),
        },
        Err(e) => LoginTemplate {
            alert: Some(Alert::error(
                "login-error",
                message_or(e.to_string(), "Invalid email or password."),
            )),
            redirect: None,
            email: form.email.trim().to_string(),
        },
    }
}

/// [Form Handler] Logout button. A failed logout keeps the member on the dashboard.
pub async fn logout(State(auth): State<AuthService>, session: Session) -> Redirect {
    match auth.logout(&session).await {
        Ok(()) => Redirect::to(INDEX_PAGE),
        Err(_) => Redirect::to(DASHBOARD_PAGE),
    }
}

/// dashboard_page
///
/// [Protected Page] Renders the cached session record. `?check=connection` additionally
/// runs the connectivity probe and shows its report.
pub async fn dashboard_page(
    State(auth): State<AuthService>,
    State(probe): State<ConnectivityProbe>,
    session: Session,
    Query(query): Query<DashboardQuery>,
) -> Response {
    let user = match auth.current_user(&session).await {
        Ok(Some(user)) => user,
        Ok(None) => return Redirect::to(LOGIN_PAGE).into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable session record");
            return Redirect::to(LOGIN_PAGE).into_response();
        }
    };

    let connection = match query.check.as_deref() {
        Some("connection") => Some(probe.check_connection().await),
        _ => None,
    };

    DashboardTemplate {
        view: DashboardView::from_profile(&user),
        alert: None,
        connection,
    }
    .into_response()
}

/// update_profile
///
/// [Form Handler] Saves the dashboard's profile form and re-renders the dashboard with the
/// merged record.
pub async fn update_profile(
    State(auth): State<AuthService>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> Response {
    let user = match auth.current_user(&session).await {
        Ok(Some(user)) => user,
        _ => return Redirect::to(LOGIN_PAGE).into_response(),
    };

    let patch = form.into_patch();
    let alert = if patch.is_empty() {
        Alert::error("profile-error", "Nothing to update")
    } else {
        match auth.update_profile(&session, user.id, &patch).await {
            Ok(()) => Alert::success("profile-success", "Your details have been updated."),
            Err(e) => Alert::error(
                "profile-error",
                message_or(e.to_string(), "Profile update failed. Please try again."),
            ),
        }
    };

    let user = match auth.current_user(&session).await {
        Ok(Some(updated)) => updated,
        _ => user,
    };

    DashboardTemplate {
        view: DashboardView::from_profile(&user),
        alert: Some(alert),
        connection: None,
    }
    .into_response()
}

/// [Operator Route] Connectivity report as JSON.
pub async fn connection_status(State(probe): State<ConnectivityProbe>) -> Json<ConnectionReport> {
    Json(probe.check_connection().await)
}

fn message_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
