use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;

use super::{StateStore, StoreError};

/// In-memory state store.
///
/// Clones share the same underlying map, so a test can hand one clone to a
/// service and keep another to inspect what was written. Reads and writes can
/// be made to fail on demand to exercise storage error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with string values.
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let state = entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.as_bytes().to_vec()))
            .collect();
        Self {
            state: Arc::new(Mutex::new(state)),
            ..Self::default()
        }
    }

    /// Make every subsequent `get` fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `put` fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw value for a key, bypassing fault injection.
    pub async fn value(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }
}

impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Read {
                key: key.to_string(),
                reason: "read failure injected".to_string(),
            });
        }
        Ok(self.state.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write {
                key: key.to_string(),
                reason: "write failure injected".to_string(),
            });
        }
        self.state.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nobody").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let store = MemoryStore::new();
        store.put("alice", b"12".to_vec()).await.unwrap();
        assert_eq!(store.get("alice").await.unwrap(), Some(b"12".to_vec()));

        store.put("alice", b"0".to_vec()).await.unwrap();
        assert_eq!(store.get("alice").await.unwrap(), Some(b"0".to_vec()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryStore::with_entries(&[("bob", "100")]);
        let other = store.clone();
        other.put("bob", b"5".to_vec()).await.unwrap();
        assert_eq!(store.value("bob").await, Some(b"5".to_vec()));
    }

    #[tokio::test]
    async fn test_fault_injection() {
        let store = MemoryStore::with_entries(&[("bob", "100")]);

        store.fail_reads(true);
        assert!(matches!(
            store.get("bob").await,
            Err(StoreError::Read { .. })
        ));
        store.fail_reads(false);
        assert!(store.get("bob").await.is_ok());

        store.fail_writes(true);
        assert!(matches!(
            store.put("bob", b"1".to_vec()).await,
            Err(StoreError::Write { .. })
        ));
        assert_eq!(store.value("bob").await, Some(b"100".to_vec()));
    }
}
