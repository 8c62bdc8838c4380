//! In-process storage. Nothing survives the process; used for tests and for
//! sessions that should not touch disk.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{SessionStorage, StorageError};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry directly, bypassing the async trait.
    #[must_use]
    pub fn with_entry(namespace: &str, value: &str) -> Self {
        let storage = Self::new();
        storage.lock().insert(namespace.to_owned(), value.to_owned());
        storage
    }

    /// Synchronous peek at an entry.
    #[must_use]
    pub fn get(&self, namespace: &str) -> Option<String> {
        self.lock().get(namespace).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl SessionStorage for MemoryStorage {
    async fn read(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get(namespace))
    }

    async fn write(&self, namespace: &str, value: &str) -> Result<(), StorageError> {
        self.lock().insert(namespace.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, namespace: &str) -> Result<(), StorageError> {
        self.lock().remove(namespace);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;
