//! Synchronous key-value seam for the device-local persistent store.
//!
//! Defines [`KeyValueStore`], the innermost local-persistence layer. The
//! local backend serializes the whole record list to one fixed key here.
//! Reads are infallible (missing keys are `None`); writes can fail (e.g.
//! quota exhaustion in the real device store).

use dashmap::DashMap;

/// Synchronous string key-value storage.
///
/// Wrapped in `Arc<dyn KeyValueStore>` for sharing across async boundaries.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve the value at `key`, or `None` if absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Insert or replace the value at `key`.
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Remove the value at `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> anyhow::Result<()>;
}

/// In-memory [`KeyValueStore`] backed by [`DashMap`].
///
/// All operations are lock-free for readers and use fine-grained sharding
/// internally for writers. Used in tests and wherever a real device store
/// is not wired in.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: DashMap<String, String>,
}

impl MemoryKeyValueStore {
    /// Creates a new, empty `MemoryKeyValueStore`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_round_trip() {
        let kv = MemoryKeyValueStore::new();

        assert!(kv.get("k").is_none());

        kv.set("k", "v").unwrap();
        assert_eq!(kv.get("k").as_deref(), Some("v"));

        kv.set("k", "v2").unwrap();
        assert_eq!(kv.get("k").as_deref(), Some("v2"));

        kv.remove("k").unwrap();
        assert!(kv.get("k").is_none());
    }

    #[test]
    fn remove_absent_key_is_noop() {
        let kv = MemoryKeyValueStore::new();
        assert!(kv.remove("missing").is_ok());
    }

    #[test]
    fn key_value_store_is_object_safe() {
        fn _assert_object_safe(_: &std::sync::Arc<dyn KeyValueStore>) {}
    }
}
