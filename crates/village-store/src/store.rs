//! Backend-agnostic save store.
//!
//! [`StateStore`] hides the three backends behind one set of typed
//! operations for the two persisted roots. Loading never fails: a missing
//! key, an unreachable backend, or a document that does not parse as the
//! expected type all come back as `None`, and the caller starts from
//! defaults.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

use village_core::config::{StorageBackend, StorageConfig};
use village_core::session::SavedGame;
use village_types::ClockSnapshot;

use crate::dragonfly::DragonflyPool;
use crate::error::StoreError;
use crate::file::FileStore;

/// Key holding the day/night clock snapshot.
pub const CLOCK_KEY: &str = "village:clock";

/// Key holding the whole saved game.
pub const STATE_KEY: &str = "village:state";

/// Durable key-value store for the two persisted roots.
#[derive(Debug, Clone)]
pub enum StateStore {
    /// Process-local map; nothing survives a restart.
    Memory(Arc<Mutex<HashMap<String, String>>>),
    /// One JSON file per key.
    File(FileStore),
    /// Redis-compatible server.
    Dragonfly(DragonflyPool),
}

impl StateStore {
    /// An empty in-memory store.
    pub fn memory() -> Self {
        Self::Memory(Arc::default())
    }

    /// Open the backend named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the `Dragonfly` URL is invalid or the
    /// server is unreachable. The file and memory backends cannot fail here.
    pub async fn open(config: &StorageConfig) -> Result<Self, StoreError> {
        let store = match config.backend {
            StorageBackend::Memory => Self::memory(),
            StorageBackend::File => Self::File(FileStore::new(&config.save_dir)),
            StorageBackend::Dragonfly => {
                Self::Dragonfly(DragonflyPool::connect(&config.dragonfly_url).await?)
            }
        };
        tracing::info!(backend = store.backend_name(), "Save store opened");
        Ok(store)
    }

    /// Short backend name for logs.
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::File(_) => "file",
            Self::Dragonfly(_) => "dragonfly",
        }
    }

    // =========================================================================
    // Raw documents
    // =========================================================================

    /// Store `document` at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend write fails.
    pub async fn put_raw(&self, key: &str, document: String) -> Result<(), StoreError> {
        match self {
            Self::Memory(map) => {
                map.lock().await.insert(key.to_owned(), document);
                Ok(())
            }
            Self::File(files) => files.write(key, &document).await,
            Self::Dragonfly(pool) => pool.set(key, &document).await,
        }
    }

    /// Read the document at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend read fails.
    pub async fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self {
            Self::Memory(map) => Ok(map.lock().await.get(key).cloned()),
            Self::File(files) => files.read(key).await,
            Self::Dragonfly(pool) => pool.get(key).await,
        }
    }

    /// Delete the document at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Memory(map) => {
                map.lock().await.remove(key);
                Ok(())
            }
            Self::File(files) => files.delete(key).await,
            Self::Dragonfly(pool) => pool.delete(key).await,
        }
    }

    // =========================================================================
    // Typed JSON
    // =========================================================================

    /// Serialize `value` as JSON and store it at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialization`] if serialization fails, or the
    /// backend error if the write fails.
    pub async fn save_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.put_raw(key, json).await
    }

    /// Read and deserialize the value at `key`.
    ///
    /// Read failures and documents that do not deserialize as `T` are
    /// logged at `warn` and reported as absent.
    pub async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let document = match self.get_raw(key).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::debug!(key, "No saved document");
                return None;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Failed to read saved document");
                return None;
            }
        };
        match serde_json::from_str(&document) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "Discarding malformed saved document");
                None
            }
        }
    }

    // =========================================================================
    // Persisted roots -- village:clock, village:state
    // =========================================================================

    /// Load the day/night clock snapshot.
    pub async fn load_clock(&self) -> Option<ClockSnapshot> {
        self.load_json(CLOCK_KEY).await
    }

    /// Load the saved game.
    pub async fn load_saved_game(&self) -> Option<SavedGame> {
        self.load_json(STATE_KEY).await
    }

    /// Write the day/night clock snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub async fn save_clock(&self, clock: &ClockSnapshot) -> Result<(), StoreError> {
        self.save_json(CLOCK_KEY, clock).await
    }

    /// Write the saved game.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or the write fails.
    pub async fn save_saved_game(&self, saved: &SavedGame) -> Result<(), StoreError> {
        self.save_json(STATE_KEY, saved).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn clock() -> ClockSnapshot {
        let t: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        ClockSnapshot {
            phase_started_at: t,
            game_started_at: t,
            is_night: true,
        }
    }

    #[tokio::test]
    async fn missing_key_loads_as_none() {
        let store = StateStore::memory();
        assert_eq!(store.load_clock().await, None);
    }

    #[tokio::test]
    async fn clock_survives_save_and_load() {
        let store = StateStore::memory();
        store.save_clock(&clock()).await.unwrap();
        assert_eq!(store.load_clock().await, Some(clock()));
    }

    #[tokio::test]
    async fn type_mismatch_is_treated_as_absent() {
        let store = StateStore::memory();
        store
            .put_raw(CLOCK_KEY, r#"{"isNight":"maybe"}"#.to_owned())
            .await
            .unwrap();
        assert_eq!(store.load_clock().await, None);

        store.put_raw(STATE_KEY, "not json".to_owned()).await.unwrap();
        assert!(store.load_saved_game().await.is_none());
    }

    #[tokio::test]
    async fn saved_game_without_notifications_is_absent() {
        let store = StateStore::memory();
        let config = village_core::config::GameConfig::default();
        let session = village_core::session::Session::new(&config, Utc::now()).unwrap();
        let mut value = serde_json::to_value(session.saved_game()).unwrap();
        value.as_object_mut().unwrap().remove("notifications");
        store.put_raw(STATE_KEY, value.to_string()).await.unwrap();
        assert!(store.load_saved_game().await.is_none());
    }

    #[tokio::test]
    async fn delete_removes_document() {
        let store = StateStore::memory();
        store.save_clock(&clock()).await.unwrap();
        store.delete(CLOCK_KEY).await.unwrap();
        assert_eq!(store.get_raw(CLOCK_KEY).await.unwrap(), None);
    }
}
