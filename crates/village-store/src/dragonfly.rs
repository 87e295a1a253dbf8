//! `Dragonfly` (Redis-compatible) save backend.
//!
//! # Key Patterns
//!
//! | Pattern | Type | Description |
//! |---------|------|-------------|
//! | `village:clock` | JSON | Day/night clock snapshot |
//! | `village:state` | JSON | Whole saved game |

use fred::prelude::*;

use crate::error::StoreError;

/// Connection handle to a `Dragonfly` (Redis-compatible) instance.
#[derive(Clone)]
pub struct DragonflyPool {
    client: Client,
}

impl std::fmt::Debug for DragonflyPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DragonflyPool").finish_non_exhaustive()
    }
}

impl DragonflyPool {
    /// Connect to `Dragonfly` at the given URL.
    ///
    /// The URL should follow the Redis URL scheme:
    /// `redis://host:port` or `redis://host:port/db`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL cannot be parsed.
    /// Returns [`StoreError::Dragonfly`] if the connection fails.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(url)
            .map_err(|e| StoreError::Config(format!("Invalid Dragonfly URL: {e}")))?;

        let client = Builder::from_config(config).build()?;
        client.init().await?;

        tracing::info!("Connected to Dragonfly");
        Ok(Self { client })
    }

    /// Store the raw document at `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the write fails.
    pub async fn set(&self, key: &str, document: &str) -> Result<(), StoreError> {
        let _: () = self.client.set(key, document, None, None, false).await?;
        Ok(())
    }

    /// Read the raw document at `key`, `None` if unset.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the read fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = self.client.get(key).await?;
        Ok(value)
    }

    /// Delete a key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Dragonfly`] if the delete fails.
    pub async fn delete(&self, key: &str) -> Result<(), StoreError> {
        let _: u32 = self.client.del(key).await?;
        Ok(())
    }
}
