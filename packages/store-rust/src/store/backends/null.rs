//! No-op [`RecordBackend`] implementation.
//!
//! [`NullBackend`] discards all writes and loads an empty collection. It is
//! the active backend before the store is initialized, and a convenient
//! test double elsewhere.

use async_trait::async_trait;
use couponvault_core::DiscountCode;
use uuid::Uuid;

use crate::store::backend::RecordBackend;

/// No-op `RecordBackend` for the uninitialized store and for tests.
///
/// All write operations succeed immediately without side effects; loads
/// return an empty collection.
pub struct NullBackend;

#[async_trait]
impl RecordBackend for NullBackend {
    async fn load(&self) -> anyhow::Result<Vec<DiscountCode>> {
        Ok(Vec::new())
    }

    async fn insert(&self, _record: &DiscountCode, _next: &[DiscountCode]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn update(&self, _record: &DiscountCode, _next: &[DiscountCode]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn delete(&self, _id: Uuid, _next: &[DiscountCode]) -> anyhow::Result<()> {
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn is_null(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use couponvault_core::{Category, RecordDraft};

    use super::*;

    fn dummy_record() -> DiscountCode {
        DiscountCode::from_draft(
            RecordDraft {
                code: "X".to_string(),
                store: "Acme".to_string(),
                discount: "10%".to_string(),
                category: Category::Other,
                ..RecordDraft::default()
            },
            chrono::Utc::now(),
        )
    }

    #[tokio::test]
    async fn load_returns_empty() {
        let backend = NullBackend;
        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_return_ok() {
        let backend = NullBackend;
        let record = dummy_record();
        assert!(backend.insert(&record, &[record.clone()]).await.is_ok());
        assert!(backend.update(&record, &[record.clone()]).await.is_ok());
        assert!(backend.delete(record.id, &[]).await.is_ok());
        assert!(backend.clear().await.is_ok());
    }

    #[test]
    fn is_null_returns_true() {
        assert!(NullBackend.is_null());
    }

    #[test]
    fn record_backend_is_object_safe() {
        fn _assert_object_safe(_: &std::sync::Arc<dyn RecordBackend>) {}
    }
}
