//! JSON-file save backend.
//!
//! Each key is one document at `{dir}/{key}.json`, with `:` in the key
//! replaced by `_`. Writes land in a sibling `.tmp` file first and are
//! renamed into place, so a crash mid-write never leaves a truncated save.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Directory of JSON save files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// A store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace(':', "_")))
    }

    /// Write `document` at `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory, temp file or rename
    /// fails.
    pub async fn write(&self, key: &str, document: &str) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StoreError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, document)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| StoreError::Io { path, source })
    }

    /// Read the document at `key`, `None` if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for any failure other than a missing file.
    pub async fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    /// Remove the document at `key`. Missing files are not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for any failure other than a missing file.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("village-store-{name}-{}", std::process::id()))
    }

    #[test]
    fn keys_map_to_flat_file_names() {
        let store = FileStore::new("/saves");
        assert_eq!(
            store.path_for("village:clock"),
            PathBuf::from("/saves/village_clock.json")
        );
    }

    #[tokio::test]
    async fn write_then_read_and_overwrite() {
        let dir = scratch_dir("overwrite");
        let store = FileStore::new(&dir);

        assert_eq!(store.read("village:state").await.unwrap(), None);
        store.write("village:state", "{\"a\":1}").await.unwrap();
        store.write("village:state", "{\"a\":2}").await.unwrap();
        assert_eq!(
            store.read("village:state").await.unwrap().as_deref(),
            Some("{\"a\":2}")
        );
        assert!(!store.path_for("village:state").with_extension("json.tmp").exists());

        store.delete("village:state").await.unwrap();
        store.delete("village:state").await.unwrap();
        assert_eq!(store.read("village:state").await.unwrap(), None);

        let _ = std::fs::remove_dir_all(dir);
    }
}
