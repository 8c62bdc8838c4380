//! HTTP binding for the SD Browser auth endpoints.
//!
//! Thin reqwest wrapper for `POST /api/v1/auth/login`,
//! `POST /api/v1/auth/register` and `GET /api/v1/auth/me`. Status mapping
//! and body parsing are pure functions so they can be tested without a
//! server.
//!
//! The backend also hands out a refresh token; it is not kept. An expired
//! access token means signing in again.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::AuthService;
use crate::session::{AuthError, Credentials, DEFAULT_TIMEZONE, User};

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

const LOGIN_PATH: &str = "/api/v1/auth/login";
const REGISTER_PATH: &str = "/api/v1/auth/register";
const ME_PATH: &str = "/api/v1/auth/me";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for AuthTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Login,
    Register,
    Me,
}

impl Action {
    fn path(self) -> &'static str {
        match self {
            Self::Login => LOGIN_PATH,
            Self::Register => REGISTER_PATH,
            Self::Me => ME_PATH,
        }
    }

    fn unauthorized_message(self) -> &'static str {
        match self {
            Self::Login | Self::Register => "Invalid credentials",
            Self::Me => "Invalid token",
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpAuthService {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthService {
    /// Build a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(base_url: &str, timeouts: AuthTimeouts) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_owned() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, action: Action) -> String {
        format!("{}{}", self.base_url, action.path())
    }

    async fn post_credentials(&self, action: Action, email: &str, password: &str) -> Result<Credentials, AuthError> {
        let url = self.endpoint(action);
        debug!(%url, email, "posting credentials");

        let response = self
            .http
            .post(&url)
            .json(&CredentialRequest { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        parse_login_response(&read_body(action, response).await?)
    }

    async fn fetch_current_user(&self, access_token: &str) -> Result<User, AuthError> {
        let url = self.endpoint(Action::Me);
        debug!(%url, "verifying access token");

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Unreachable(e.to_string()))?;

        parse_user_response(&read_body(Action::Me, response).await?)
    }
}

/// Body of a 2xx response, or the mapped error for any other status.
async fn read_body(action: Action, response: reqwest::Response) -> Result<String, AuthError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| AuthError::Unreachable(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(status_error(action, status, text));
    }
    Ok(text)
}

#[async_trait::async_trait]
impl AuthService for HttpAuthService {
    async fn exchange_credentials(&self, email: &str, password: &str) -> Result<Credentials, AuthError> {
        self.post_credentials(Action::Login, email, password).await
    }

    async fn register(&self, email: &str, password: &str) -> Result<Credentials, AuthError> {
        self.post_credentials(Action::Register, email, password).await
    }

    async fn current_user(&self, access_token: &str) -> Result<User, AuthError> {
        self.fetch_current_user(access_token).await
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Serialize)]
struct CredentialRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    user: UserResponse,
}

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    email: String,
    timezone: Option<String>,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    is_admin: bool,
}

fn default_active() -> bool {
    true
}

impl UserResponse {
    fn into_user(self) -> Result<User, AuthError> {
        if !self.is_active {
            return Err(AuthError::Rejected("Account is inactive".into()));
        }
        let user = User {
            id: self.id,
            email: self.email,
            timezone: self
                .timezone
                .filter(|tz| !tz.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TIMEZONE.to_owned()),
            is_admin: self.is_admin,
        };
        if !user.is_valid() {
            return Err(AuthError::InvalidResponse("user is missing id or email".into()));
        }
        Ok(user)
    }
}

#[derive(Deserialize)]
struct ErrorResponse {
    detail: serde_json::Value,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_login_response(json: &str) -> Result<Credentials, AuthError> {
    let body: LoginResponse = serde_json::from_str(json).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

    if body.access_token.trim().is_empty() {
        return Err(AuthError::InvalidResponse("empty access_token".into()));
    }
    let user = body.user.into_user()?;
    Ok(Credentials { user, access_token: body.access_token })
}

fn parse_user_response(json: &str) -> Result<User, AuthError> {
    let body: UserResponse = serde_json::from_str(json).map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
    body.into_user()
}

/// Extract the `detail` message from an error body, if it has one.
fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorResponse = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn status_error(action: Action, status: u16, body: String) -> AuthError {
    match (action, status) {
        (_, 401 | 403) => {
            AuthError::Rejected(error_detail(&body).unwrap_or_else(|| action.unauthorized_message().to_owned()))
        }
        (_, 422) | (Action::Register, 400 | 409) => {
            AuthError::Rejected(error_detail(&body).unwrap_or_else(|| format!("request rejected: {status}")))
        }
        _ => AuthError::UnexpectedStatus { status, body },
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
