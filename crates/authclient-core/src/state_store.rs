// Per-session key-value store holding the CSRF state of an in-flight
// authorization flow.
//
// The host hands the client the store belonging to the current user session,
// so isolation between sessions comes from the host, not from the keys.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Session-scoped storage for ephemeral flow state.
///
/// Implementations must offer read-after-write consistency within one
/// session. Backends that cannot expire entries may ignore `ttl`.
#[async_trait]
pub trait StateStore: Send + Sync + std::fmt::Debug {
    /// Get a value by key. Returns `None` if the key is absent or has expired.
    async fn get(&self, key: &str) -> Result<Option<String>, StateStoreError>;

    /// Store a value, replacing any previous one. `ttl` is in seconds.
    async fn put(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), StateStoreError>;

    /// Remove a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StateStoreError>;

    /// Atomically remove `key` if its live value satisfies `matches`.
    ///
    /// Returns `true` when the entry was removed. A value that does not match
    /// stays in place. Two concurrent calls never both return `true` for the
    /// same stored value.
    async fn remove_if(
        &self,
        key: &str,
        matches: &(dyn for<'a> Fn(&'a str) -> bool + Send + Sync),
    ) -> Result<bool, StateStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StateStoreError {
    #[error("State store operation failed: {0}")]
    OperationFailed(String),
}

/// In-memory [`StateStore`] backed by a `HashMap` with TTL.
///
/// One instance per user session. Useful for tests and single-process hosts.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: Mutex<HashMap<String, MemoryEntry>>,
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, MemoryEntry>>, StateStoreError> {
        self.entries
            .lock()
            .map_err(|e| StateStoreError::OperationFailed(format!("lock poisoned: {e}")))
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StateStoreError> {
        let mut entries = self.lock()?;
        let Some(entry) = entries.get(key) else {
            return Ok(None);
        };
        if entry.expires_at.is_some_and(|at| Instant::now() >= at) {
            tracing::debug!(key, "state entry expired");
            entries.remove(key);
            return Ok(None);
        }
        Ok(Some(entry.value.clone()))
    }

    async fn put(&self, key: &str, value: &str, ttl: Option<u64>) -> Result<(), StateStoreError> {
        // A TTL past the clock's range means no expiry.
        let expires_at =
            ttl.and_then(|secs| Instant::now().checked_add(Duration::from_secs(secs)));
        self.lock()?.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StateStoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn remove_if(
        &self,
        key: &str,
        matches: &(dyn for<'a> Fn(&'a str) -> bool + Send + Sync),
    ) -> Result<bool, StateStoreError> {
        let mut entries = self.lock()?;
        let Some(entry) = entries.get(key) else {
            return Ok(false);
        };
        if entry.expires_at.is_some_and(|at| Instant::now() >= at) {
            tracing::debug!(key, "state entry expired");
            entries.remove(key);
            return Ok(false);
        }
        if !matches(&entry.value) {
            return Ok(false);
        }
        entries.remove(key);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_state_store_put_get() {
        let store = MemoryStateStore::new();
        store.put("key1", "value1", None).await.unwrap();
        let val = store.get("key1").await.unwrap();
        assert_eq!(val, Some("value1".to_string()));
    }

    #[tokio::test]
    async fn test_memory_state_store_remove() {
        let store = MemoryStateStore::new();
        store.put("key1", "value1", None).await.unwrap();
        store.remove("key1").await.unwrap();
        assert_eq!(store.get("key1").await.unwrap(), None);
        // Second remove is a no-op
        store.remove("key1").await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_state_store_overwrite() {
        let store = MemoryStateStore::new();
        store.put("k", "v1", None).await.unwrap();
        store.put("k", "v2", None).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some("v2".to_string()));
    }

    #[tokio::test]
    async fn test_memory_state_store_expired_entry_reads_absent() {
        let store = MemoryStateStore::new();
        store.put("k", "v", Some(0)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_huge_ttl_never_expires() {
        let store = MemoryStateStore::new();
        store.put("k", "v", Some(u64::MAX)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_remove_if_only_removes_matching_value() {
        let store = MemoryStateStore::new();
        store.put("k", "xyz", None).await.unwrap();

        assert!(!store.remove_if("k", &|v: &str| v == "abc").await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("xyz"));

        assert!(store.remove_if("k", &|v: &str| v == "xyz").await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
        assert!(!store.remove_if("k", &|v: &str| v == "xyz").await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_if_skips_expired_entry() {
        let store = MemoryStateStore::new();
        store.put("k", "v", Some(0)).await.unwrap();
        assert!(!store.remove_if("k", &|_: &str| true).await.unwrap());
    }

    #[tokio::test]
    async fn test_sessions_do_not_share_entries() {
        let alice = MemoryStateStore::new();
        let bob = MemoryStateStore::new();
        alice.put("state", "a", None).await.unwrap();
        bob.put("state", "b", None).await.unwrap();
        assert_eq!(alice.get("state").await.unwrap().as_deref(), Some("a"));
        assert_eq!(bob.get("state").await.unwrap().as_deref(), Some("b"));
    }
}
