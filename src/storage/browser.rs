//! Browser `localStorage` backend (hydrate builds only).
//!
//! TRADE-OFFS
//! ==========
//! `localStorage` is synchronous; the async trait methods complete without
//! yielding. A missing window or disabled storage (private browsing, SSR) is
//! reported as [`StorageError::Unavailable`] so restore degrades to
//! anonymous instead of failing hydration.

use super::{SessionStorage, StorageError};

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or_else(|| StorageError::Unavailable("no window".into()))?
        .local_storage()
        .map_err(|_| StorageError::Unavailable("localStorage access denied".into()))?
        .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
}

#[async_trait::async_trait]
impl SessionStorage for BrowserStorage {
    async fn read(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(namespace)
            .map_err(|_| StorageError::Unavailable(format!("localStorage read failed for {namespace}")))
    }

    async fn write(&self, namespace: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(namespace, value)
            .map_err(|_| StorageError::Unavailable(format!("localStorage write failed for {namespace}")))
    }

    async fn remove(&self, namespace: &str) -> Result<(), StorageError> {
        local_storage()?
            .remove_item(namespace)
            .map_err(|_| StorageError::Unavailable(format!("localStorage remove failed for {namespace}")))
    }
}
