//! Session model types and errors.
//!
//! DESIGN
//! ======
//! `Session` is the in-memory record published by `SessionStore`. Identity
//! and token are stored separately so `set_user`/`set_token` can install one
//! without the other, but every query treats a half-populated session as
//! anonymous.

use serde::{Deserialize, Serialize};

use crate::storage::StorageError;

/// Timezone assumed when the auth service does not report one.
pub const DEFAULT_TIMEZONE: &str = "UTC";

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_owned()
}

// =============================================================================
// USER
// =============================================================================

/// Identity of the signed-in actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable user identifier assigned by the auth service.
    pub id: String,
    /// Login email address.
    pub email: String,
    /// IANA timezone name used when rendering guide times.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Whether the user may open the admin pages.
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    /// A user record is usable only with a non-blank id and email.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.id.trim().is_empty() && !self.email.trim().is_empty()
    }
}

/// A complete identity + credential pair, as returned by the auth service
/// and as written to durable storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: User,
    pub access_token: String,
}

// =============================================================================
// SESSION
// =============================================================================

/// Coarse lifecycle position derived from a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    /// Loading the persisted session at startup.
    Restoring,
    Authenticating,
    Authenticated,
}

/// The authoritative record of the current actor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub access_token: Option<String>,
    /// True only while a login or restore is in flight.
    pub is_loading: bool,
}

impl Session {
    /// True iff both identity and token are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.access_token.is_some()
    }

    /// Derived from the fields alone. A session value cannot tell a restore
    /// from a login, so loading always reads as `Authenticating` here;
    /// `SessionStore::auth_state` distinguishes [`AuthState::Restoring`].
    #[must_use]
    pub fn auth_state(&self) -> AuthState {
        if self.is_authenticated() {
            AuthState::Authenticated
        } else if self.is_loading {
            AuthState::Authenticating
        } else {
            AuthState::Anonymous
        }
    }

    /// The complete credential pair, or `None` for a partial/empty session.
    #[must_use]
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.user, &self.access_token) {
            (Some(user), Some(token)) => Some(Credentials { user: user.clone(), access_token: token.clone() }),
            _ => None,
        }
    }

    pub(crate) fn install(&mut self, credentials: Credentials) {
        self.user = Some(credentials.user);
        self.access_token = Some(credentials.access_token);
    }

    pub(crate) fn clear(&mut self) {
        self.user = None;
        self.access_token = None;
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Failure of a login or registration attempt. Surfaced to the user; the
/// session stays anonymous.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Email or password was blank; no exchange was attempted.
    #[error("email and password are required")]
    MissingCredentials,

    /// Another login or registration is still in flight.
    #[error("a sign-in attempt is already in progress")]
    InProgress,

    /// A session is already installed; log out before signing in again.
    #[error("already signed in")]
    AlreadyAuthenticated,

    /// A logout happened while the attempt was in flight; nothing was installed.
    #[error("sign-in superseded by logout")]
    Superseded,

    /// The store has not finished restoring the persisted session.
    #[error("session restore has not completed")]
    NotRestored,

    /// The auth service rejected the credentials.
    #[error("credentials rejected: {0}")]
    Rejected(String),

    /// The auth service could not be reached.
    #[error("authentication service unreachable: {0}")]
    Unreachable(String),

    /// The auth service answered with a status we do not handle.
    #[error("authentication service returned status {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The auth service answered 2xx with a body we could not use.
    #[error("invalid authentication response: {0}")]
    InvalidResponse(String),
}

impl AuthError {
    /// Stable machine-readable code for UI messages and logs.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredentials => "E_MISSING_CREDENTIALS",
            Self::InProgress => "E_IN_PROGRESS",
            Self::AlreadyAuthenticated => "E_ALREADY_AUTHENTICATED",
            Self::Superseded => "E_SUPERSEDED",
            Self::NotRestored => "E_NOT_RESTORED",
            Self::Rejected(_) => "E_REJECTED",
            Self::Unreachable(_) => "E_UNREACHABLE",
            Self::UnexpectedStatus { .. } => "E_UNEXPECTED_STATUS",
            Self::InvalidResponse(_) => "E_INVALID_RESPONSE",
        }
    }

    /// Whether repeating the same attempt later could succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(
            self,
            Self::InProgress | Self::NotRestored | Self::Unreachable(_) | Self::UnexpectedStatus { status: 429 | 500..=599, .. }
        )
    }
}

/// Failure to load a persisted session. Never surfaced: the store discards
/// the snapshot and starts anonymous.
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("snapshot is not valid JSON: {0}")]
    Malformed(String),

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u64, expected: u64 },

    #[error("snapshot is missing or has an empty `{0}`")]
    Incomplete(&'static str),

    #[error("snapshot read failed: {0}")]
    Storage(#[from] StorageError),
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
