//! Durable key-value storage for session snapshots.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` is the only caller. Values are opaque strings (encoded by
//! `session::snapshot`) so each backend stays a thin persistence shim:
//! an in-process map, one file per namespace on disk, or browser
//! `localStorage` under the `hydrate` feature.

pub mod file;
pub mod memory;

#[cfg(feature = "hydrate")]
pub mod browser;

pub use file::FileStorage;
pub use memory::MemoryStorage;

#[cfg(feature = "hydrate")]
pub use browser::BrowserStorage;

/// Errors produced by storage backends.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem read/write failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The snapshot could not be serialized.
    #[error("snapshot encode failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The backend is not available in this environment.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The namespace contains characters the backend cannot key on.
    #[error("invalid storage namespace `{0}`")]
    InvalidNamespace(String),
}

/// Key-value persistence surface used for session snapshots.
#[async_trait::async_trait]
pub trait SessionStorage: Send + Sync {
    /// Read the value stored under `namespace`, or `None` if absent.
    async fn read(&self, namespace: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `namespace`.
    async fn write(&self, namespace: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `namespace`. Removing an absent entry succeeds.
    async fn remove(&self, namespace: &str) -> Result<(), StorageError>;
}

/// Namespaces double as file names, so keep them to a safe alphabet.
pub(crate) fn validate_namespace(namespace: &str) -> Result<(), StorageError> {
    let ok = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        && !namespace.starts_with('.');
    if ok { Ok(()) } else { Err(StorageError::InvalidNamespace(namespace.to_owned())) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_namespace_accepts_session_key() {
        assert!(validate_namespace("auth-storage").is_ok());
        assert!(validate_namespace("auth_storage.v1").is_ok());
    }

    #[test]
    fn validate_namespace_rejects_paths_and_blank() {
        for bad in ["", "../etc", "a/b", ".hidden", "a b"] {
            assert!(
                matches!(validate_namespace(bad), Err(StorageError::InvalidNamespace(_))),
                "expected rejection for {bad:?}"
            );
        }
    }
}
