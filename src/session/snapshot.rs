//! Durable snapshot encoding for a session.
//!
//! The snapshot is a JSON object tagged with a schema version. Only the
//! identity and token are written; the loading flag is transient and always
//! starts false.
//!
//! ERROR HANDLING
//! ==============
//! Any version other than [`SNAPSHOT_VERSION`], any missing field and any
//! blank id/email/token decodes to a [`RestoreError`]. Callers treat every
//! decode failure the same way: discard and start anonymous.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{Credentials, RestoreError, User};
use crate::storage::StorageError;

/// Storage namespace the session snapshot is kept under.
pub const SESSION_NAMESPACE: &str = "auth-storage";

/// Current snapshot schema version. Bump on incompatible changes.
pub const SNAPSHOT_VERSION: u64 = 1;

#[derive(Serialize)]
struct SnapshotOut<'a> {
    version: u64,
    user: &'a User,
    access_token: &'a str,
}

#[derive(Deserialize)]
struct SnapshotIn {
    user: Option<User>,
    access_token: Option<String>,
}

/// Serialize a complete session for storage.
///
/// # Errors
///
/// Returns [`StorageError::Encode`] if serialization fails.
pub fn encode(credentials: &Credentials) -> Result<String, StorageError> {
    let out = SnapshotOut {
        version: SNAPSHOT_VERSION,
        user: &credentials.user,
        access_token: &credentials.access_token,
    };
    Ok(serde_json::to_string(&out)?)
}

/// Parse a stored snapshot back into a complete session.
///
/// # Errors
///
/// Returns a [`RestoreError`] for malformed JSON, a foreign schema version or
/// a partial session.
pub fn decode(raw: &str) -> Result<Credentials, RestoreError> {
    let value: Value = serde_json::from_str(raw).map_err(|e| RestoreError::Malformed(e.to_string()))?;

    let found = value
        .get("version")
        .ok_or(RestoreError::Incomplete("version"))?
        .as_u64()
        .ok_or_else(|| RestoreError::Malformed("version is not an unsigned integer".into()))?;
    if found != SNAPSHOT_VERSION {
        return Err(RestoreError::UnsupportedVersion { found, expected: SNAPSHOT_VERSION });
    }

    let record: SnapshotIn = serde_json::from_value(value).map_err(|e| RestoreError::Malformed(e.to_string()))?;

    let user = record.user.ok_or(RestoreError::Incomplete("user"))?;
    if user.id.trim().is_empty() {
        return Err(RestoreError::Incomplete("user.id"));
    }
    if user.email.trim().is_empty() {
        return Err(RestoreError::Incomplete("user.email"));
    }
    let access_token = record
        .access_token
        .filter(|t| !t.trim().is_empty())
        .ok_or(RestoreError::Incomplete("access_token"))?;

    Ok(Credentials { user, access_token })
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
