//! Device-local [`RecordBackend`] over a synchronous key-value store.
//!
//! The whole collection lives as one JSON array at a fixed key, with dates
//! serialized as ISO-8601 strings. Missing keys mean an empty collection;
//! unparsable content is silently discarded rather than failing the
//! session.

use std::sync::Arc;

use async_trait::async_trait;
use couponvault_core::DiscountCode;
use uuid::Uuid;

use crate::store::backend::RecordBackend;
use crate::store::kv::KeyValueStore;

/// Local persistent store adapter: one fixed key, whole-list writes.
pub struct LocalBackend {
    kv: Arc<dyn KeyValueStore>,
    storage_key: String,
}

impl LocalBackend {
    /// Creates a local backend writing to `storage_key` in `kv`.
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, storage_key: String) -> Self {
        Self { kv, storage_key }
    }

    /// Serializes and writes the full list to the fixed key.
    fn save(&self, next: &[DiscountCode]) -> anyhow::Result<()> {
        let payload = serde_json::to_string(next)?;
        self.kv.set(&self.storage_key, &payload)
    }
}

#[async_trait]
impl RecordBackend for LocalBackend {
    async fn load(&self) -> anyhow::Result<Vec<DiscountCode>> {
        let Some(raw) = self.kv.get(&self.storage_key) else {
            return Ok(Vec::new());
        };
        // Corruption policy: treat unparsable cached data as absent data,
        // never as a session-fatal error.
        Ok(serde_json::from_str(&raw).unwrap_or_else(|err| {
            tracing::warn!(%err, key = %self.storage_key, "discarding unparsable cached records");
            Vec::new()
        }))
    }

    async fn insert(&self, _record: &DiscountCode, next: &[DiscountCode]) -> anyhow::Result<()> {
        self.save(next)
    }

    async fn update(&self, _record: &DiscountCode, next: &[DiscountCode]) -> anyhow::Result<()> {
        self.save(next)
    }

    async fn delete(&self, _id: Uuid, next: &[DiscountCode]) -> anyhow::Result<()> {
        self.save(next)
    }

    async fn clear(&self) -> anyhow::Result<()> {
        self.kv.remove(&self.storage_key)
    }
}
