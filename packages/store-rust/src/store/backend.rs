//! Durable-write seam between the mutation pipeline and a backend.
//!
//! Defines [`RecordBackend`], the trait the pipeline commits through after
//! publishing an optimistic next state. Exactly one backend is active per
//! session; which one depends on the identity signal (see
//! [`selector`](super::selector)).

use async_trait::async_trait;
use couponvault_core::DiscountCode;
use uuid::Uuid;

/// Durable persistence backend for the record collection.
///
/// The mutation pipeline calls one granular op per committed mutation.
/// Each op also receives the full post-mutation list, so whole-list
/// backends (local fixed key) and row backends (remote table) share one
/// seam: a whole-list backend persists `next` and ignores the granular
/// argument, a row backend does the opposite.
///
/// Used as `Arc<dyn RecordBackend>`.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    /// Load the full collection, newest first.
    async fn load(&self) -> anyhow::Result<Vec<DiscountCode>>;

    /// Persist a newly created record.
    async fn insert(&self, record: &DiscountCode, next: &[DiscountCode]) -> anyhow::Result<()>;

    /// Persist an updated record.
    async fn update(&self, record: &DiscountCode, next: &[DiscountCode]) -> anyhow::Result<()>;

    /// Remove a record by id.
    async fn delete(&self, id: Uuid, next: &[DiscountCode]) -> anyhow::Result<()>;

    /// Bulk-clear the backing store.
    async fn clear(&self) -> anyhow::Result<()>;

    /// Whether this is a null (no-op) implementation.
    ///
    /// Returns `false` by default. Null implementations override to return `true`.
    fn is_null(&self) -> bool {
        false
    }
}
