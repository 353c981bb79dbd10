//! Persistent key-value storage abstraction.
//!
//! Cart, address book, and order ledger durability all go through a single
//! [`KvStore`] trait: opaque byte values under string keys, no transactional
//! guarantees across keys. The device storage layer supplies the real backend;
//! [`MemoryStore`] is provided for tests and demos.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur when reading or writing the backing store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage backend failed to complete the operation.
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A stored record exists but could not be decoded.
    #[error("corrupt record at key {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Generic persistent key-value store.
///
/// Implementations must be safe to call concurrently; callers serialize
/// writes per key themselves.
#[automock]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Fetch the bytes stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Removing a missing key is not an
    /// error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Load and decode a JSON snapshot from the store.
///
/// # Errors
///
/// Returns `StorageError::Corrupt` when the stored bytes are not valid JSON
/// for `T`, or the backend error otherwise.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(bytes) = store.get(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
        key: key.to_string(),
        source,
    })?;
    Ok(Some(value))
}

/// Encode a snapshot as JSON and write it to the store.
///
/// # Errors
///
/// Returns the backend error if the write fails. Encoding a serde-derived
/// snapshot cannot fail in practice; an encode failure is reported as
/// `StorageError::Backend`.
pub async fn save_json<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes =
        serde_json::to_vec(value).map_err(|e| StorageError::Backend(format!("encode: {e}")))?;
    store.set(key, bytes).await
}

/// In-memory [`KvStore`] backed by a `HashMap`.
///
/// Used by tests and demos; real deployments plug in the device's secure
/// storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map only means another test thread panicked mid-write;
        // the bytes themselves are still usable.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        value: u32,
    }

    #[tokio::test]
    async fn test_json_round_trip() {
        let store = MemoryStore::new();
        save_json(&store, "snap", &Snapshot { value: 7 })
            .await
            .expect("save");

        let loaded: Option<Snapshot> = load_json(&store, "snap").await.expect("load");
        assert_eq!(loaded, Some(Snapshot { value: 7 }));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let loaded: Option<Snapshot> = load_json(&store, "absent").await.expect("load");
        assert_eq!(loaded, None);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_classified() {
        let store = MemoryStore::new();
        store
            .set("snap", b"not json".to_vec())
            .await
            .expect("set");

        let err = load_json::<Snapshot>(&store, "snap")
            .await
            .expect_err("corrupt");
        assert!(matches!(err, StorageError::Corrupt { .. }));
    }

    #[tokio::test]
    async fn test_remove_missing_key_ok() {
        let store = MemoryStore::new();
        store.remove("absent").await.expect("remove");
    }
}
