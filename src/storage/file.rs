//! On-disk storage: one `<namespace>.json` file per entry under a directory.
//!
//! Writes go to a sibling temp file which is then renamed over the target,
//! so a crash mid-write leaves either the old snapshot or the new one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{SessionStorage, StorageError, validate_namespace};

#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidNamespace`] for names that are not a
    /// plain file stem.
    pub fn path_for(&self, namespace: &str) -> Result<PathBuf, StorageError> {
        validate_namespace(namespace)?;
        Ok(self.dir.join(format!("{namespace}.json")))
    }
}

#[async_trait::async_trait]
impl SessionStorage for FileStorage {
    async fn read(&self, namespace: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(namespace)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, namespace: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(namespace)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        let tmp = self.dir.join(format!("{namespace}.json.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        debug!(path = %path.display(), "session snapshot written");
        Ok(())
    }

    async fn remove(&self, namespace: &str) -> Result<(), StorageError> {
        let path = self.path_for(namespace)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "session snapshot removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "file_test.rs"]
mod tests;
