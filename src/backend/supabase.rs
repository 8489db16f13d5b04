use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use uuid::Uuid;

use super::{Backend, BackendError, PROFILES_TABLE};
use crate::{
    credentials::Credentials,
    models::{AuthSession, AuthUser, NewProfile, Profile, ProfilePatch},
};

// 2. The Real Implementation (hosted Supabase project)
/// SupabaseClient
///
/// Talks to a Supabase project over its REST gateways: GoTrue under `/auth/v1` for
/// identities and PostgREST under `/rest/v1` for table rows. Every request carries the
/// project's API key; requests made for a signed-in member use that member's access token
/// as the bearer so row-level security sees the right identity.
#[derive(Clone)]
pub struct SupabaseClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

/// Body shape of GoTrue's signup and token endpoints. Signup answers with a bare user
/// object when confirmation is pending, and with a full session otherwise.
#[derive(Deserialize)]
struct GoTrueResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    email: Option<String>,
}

impl GoTrueResponse {
    fn into_session(self) -> Result<AuthSession, BackendError> {
        let Self {
            access_token,
            user,
            id,
            email,
        } = self;

        let user = match (user, id) {
            (Some(user), _) => user,
            (None, Some(id)) => AuthUser { id, email },
            (None, None) => {
                return Err(BackendError::Decode(
                    "auth response did not include a user".to_string(),
                ));
            }
        };

        Ok(AuthSession { user, access_token })
    }
}

/// The fields GoTrue and PostgREST use to describe a failure, across API versions.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl SupabaseClient {
    /// new
    ///
    /// Builds the client from resolved credentials. Fails only when the URL does not parse
    /// or the HTTP client cannot be constructed; nothing is sent over the network here.
    pub fn new(credentials: &Credentials) -> Result<Self, BackendError> {
        let endpoint = credentials.url.trim().trim_end_matches('/').to_string();
        Url::parse(&endpoint)
            .map_err(|e| BackendError::Config(format!("invalid project URL {endpoint:?}: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("batts-portal/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            http,
            endpoint,
            api_key: credentials.key.trim().to_string(),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.endpoint, path)
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.endpoint, table)
    }

    fn request(&self, method: Method, url: String, access_token: Option<&str>) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token.unwrap_or(&self.api_key))
    }

    async fn password_grant(
        &self,
        url: String,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let response = self
            .request(Method::POST, url, None)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        check(response)
            .await?
            .json::<GoTrueResponse>()
            .await?
            .into_session()
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, BackendError> {
        self.password_grant(self.auth_url("signup"), email, password)
            .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        self.password_grant(self.auth_url("token?grant_type=password"), email, password)
            .await
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let response = self
            .request(Method::POST, self.auth_url("logout"), Some(access_token))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn insert_profile(
        &self,
        profile: &NewProfile,
        access_token: Option<&str>,
    ) -> Result<Profile, BackendError> {
        let response = self
            .request(Method::POST, self.rest_url(PROFILES_TABLE), access_token)
            .header("Prefer", "return=representation")
            .json(&[profile])
            .send()
            .await?;

        check(response)
            .await?
            .json::<Vec<Profile>>()
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode("insert returned no rows".to_string()))
    }

    async fn select_profiles(
        &self,
        id: Uuid,
        access_token: Option<&str>,
    ) -> Result<Vec<Profile>, BackendError> {
        let response = self
            .request(Method::GET, self.rest_url(PROFILES_TABLE), access_token)
            .query(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .send()
            .await?;

        Ok(check(response).await?.json::<Vec<Profile>>().await?)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        patch: &ProfilePatch,
        access_token: Option<&str>,
    ) -> Result<(), BackendError> {
        let response = self
            .request(Method::PATCH, self.rest_url(PROFILES_TABLE), access_token)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn probe(&self) -> Result<(), BackendError> {
        let response = self
            .request(Method::GET, self.rest_url(PROFILES_TABLE), None)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

/// Passes successful responses through and turns everything else into `BackendError::Api`.
async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.msg.or(b.message).or(b.error_description).or(b.error))
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            let reason = status.canonical_reason().unwrap_or("request failed");
            format!("{} {}", status.as_u16(), reason)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_backend_wording() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials"
        );

        let body = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert_eq!(
            error_message(StatusCode::CONFLICT, body),
            "duplicate key value violates unique constraint"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::SERVICE_UNAVAILABLE, "<html>"),
            "503 Service Unavailable"
        );
    }

    #[test]
    fn signup_without_session_still_yields_user() {
        let id = Uuid::new_v4();
        let body = format!(r#"{{"id":"{id}","email":"a@b.c","confirmation_sent_at":"x"}}"#);
        let session = serde_json::from_str::<GoTrueResponse>(&body)
            .unwrap()
            .into_session()
            .unwrap();
        assert_eq!(session.user.id, id);
        assert!(session.access_token.is_none());
    }

    #[test]
    fn rejects_unparseable_url() {
        let result = SupabaseClient::new(&Credentials::new("not a url", "key"));
        assert!(matches!(result, Err(BackendError::Config(_))));
    }
}
