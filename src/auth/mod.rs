//! Authentication service collaborator.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` owns the session lifecycle; it delegates the actual
//! credential exchange to an [`AuthService`]. Production uses
//! [`http::HttpAuthService`] against the SD Browser REST API; tests inject
//! mocks.

pub mod http;

pub use http::{AuthTimeouts, HttpAuthService};

use crate::session::{AuthError, Credentials, User};

/// Exchanges an email/password pair for an identity and access token.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Sign in an existing account.
    async fn exchange_credentials(&self, email: &str, password: &str) -> Result<Credentials, AuthError>;

    /// Create an account and sign it in.
    async fn register(&self, email: &str, password: &str) -> Result<Credentials, AuthError>;

    /// Resolve the user an access token currently belongs to. An expired or
    /// revoked token is [`AuthError::Rejected`].
    async fn current_user(&self, access_token: &str) -> Result<User, AuthError>;
}
