//! Local key-value storage.
//!
//! The storefront's guest-mode cache lives in a flat string-to-string store,
//! the same shape as browser local storage. [`KeyValueStore`] is that store;
//! [`LocalStorage`] layers JSON values, the canonical key scheme and change
//! notifications on top of it.
//!
//! Writes are whole-value: callers read a collection, change it in memory and
//! write it back. Two writers racing on one key means last write wins.

mod file;
pub mod keys;
mod memory;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::events::{EventBus, StoreEvent};

pub use file::FileStore;
pub use keys::Scope;
pub use memory::MemoryStore;

/// Errors that can occur when writing to a store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A flat string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read a raw value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a raw value, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Deleting an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// JSON-valued view over a [`KeyValueStore`] that announces every change.
#[derive(Clone)]
pub struct LocalStorage {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
}

impl std::fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalStorage").finish_non_exhaustive()
    }
}

impl LocalStorage {
    /// Wrap a store; changes are published on `events`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    /// Read a raw string value.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    /// Write a raw string value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the value.
    pub fn set_raw(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.store.set(key, value)?;
        self.events.emit(StoreEvent::Storage {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Read and parse a JSON value.
    ///
    /// Missing keys and unparseable content both come back as `None`; guest
    /// data is low-stakes and a corrupt entry is treated as absent.
    #[must_use]
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.store.get(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(key, error = %e, "Ignoring unparseable stored value");
                None
            }
        }
    }

    /// Serialize and write a JSON value.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)?;
        self.set_raw(key, &raw)
    }

    /// Delete a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the deletion cannot be persisted.
    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.store.get(key).is_none() {
            return Ok(());
        }
        self.store.remove(key)?;
        self.events.emit(StoreEvent::Storage {
            key: key.to_string(),
        });
        Ok(())
    }

    /// Whether a key holds any value.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.store.get(key).is_some()
    }

    /// Read a JSON value from its canonical key, migrating it from a legacy
    /// key if only the legacy one exists.
    ///
    /// Migration failures are logged and the legacy value is still returned.
    pub fn get_json_migrating<T>(&self, key: &str, legacy_keys: &[String]) -> Option<T>
    where
        T: DeserializeOwned + Serialize,
    {
        if self.contains(key) {
            return self.get_json(key);
        }

        for legacy in legacy_keys {
            let Some(value) = self.get_json::<T>(legacy) else {
                continue;
            };
            debug!(from = %legacy, to = %key, "Migrating legacy storage key");
            if let Err(e) = self.set_json(key, &value).and_then(|()| self.remove(legacy)) {
                tracing::warn!(key, error = %e, "Failed to migrate legacy storage key");
            }
            return Some(value);
        }

        None
    }

    /// The event bus changes are announced on.
    #[must_use]
    pub const fn events(&self) -> &EventBus {
        &self.events
    }
}
