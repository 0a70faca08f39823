//! Remote [`RecordBackend`] over an owner-scoped relational table.
//!
//! Issues row CRUD against a [`RemoteTable`] scoped to the owning identity
//! and exposes the owner's change-feed subscription. In remote mode the
//! table is the system of record; the client list is a reconciled cache.

use std::sync::Arc;

use async_trait::async_trait;
use couponvault_core::DiscountCode;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::store::backend::RecordBackend;
use crate::store::remote_table::{ChangeEvent, RecordRow, RemoteTable};

/// Remote store adapter: owner-scoped row CRUD plus the change feed.
pub struct RemoteBackend {
    table: Arc<dyn RemoteTable>,
    owner: String,
}

impl RemoteBackend {
    /// Creates a remote backend scoped to `owner`.
    #[must_use]
    pub fn new(table: Arc<dyn RemoteTable>, owner: String) -> Self {
        Self { table, owner }
    }

    /// Opens the change-feed subscription for the owning identity.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.table.subscribe(&self.owner)
    }
}

#[async_trait]
impl RecordBackend for RemoteBackend {
    async fn load(&self) -> anyhow::Result<Vec<DiscountCode>> {
        let rows = self.table.select_owned(&self.owner).await?;
        Ok(rows.into_iter().map(RecordRow::into_record).collect())
    }

    async fn insert(&self, record: &DiscountCode, _next: &[DiscountCode]) -> anyhow::Result<()> {
        self.table
            .insert(RecordRow::from_record(&self.owner, record))
            .await
    }

    async fn update(&self, record: &DiscountCode, _next: &[DiscountCode]) -> anyhow::Result<()> {
        self.table
            .update(RecordRow::from_record(&self.owner, record))
            .await
    }

    async fn delete(&self, id: Uuid, _next: &[DiscountCode]) -> anyhow::Result<()> {
        self.table.delete(&self.owner, id).await
    }

    async fn clear(&self) -> anyhow::Result<()> {
        for row in self.table.select_owned(&self.owner).await? {
            self.table.delete(&self.owner, row.id).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use couponvault_core::RecordDraft;

    use super::*;
    use crate::store::remote_table::MemoryRemoteTable;

    fn record(code: &str) -> DiscountCode {
        DiscountCode::from_draft(
            RecordDraft {
                code: code.to_string(),
                store: "Acme".to_string(),
                discount: "10%".to_string(),
                ..RecordDraft::default()
            },
            Utc::now(),
        )
    }

    fn backend() -> (Arc<MemoryRemoteTable>, RemoteBackend) {
        let table = Arc::new(MemoryRemoteTable::new());
        let backend = RemoteBackend::new(table.clone(), "alice".to_string());
        (table, backend)
    }

    #[tokio::test]
    async fn insert_then_load_round_trips() {
        let (_table, backend) = backend();
        let r = record("A");
        backend.insert(&r, &[r.clone()]).await.unwrap();

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded, vec![r]);
    }

    #[tokio::test]
    async fn load_excludes_other_owners() {
        let (table, backend) = backend();
        let foreign = RemoteBackend::new(table, "bob".to_string());
        let r = record("THEIRS");
        foreign.insert(&r, &[r.clone()]).await.unwrap();

        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_row_wholesale() {
        let (_table, backend) = backend();
        let mut r = record("A");
        backend.insert(&r, &[r.clone()]).await.unwrap();

        r.is_archived = true;
        r.description = "stale".to_string();
        backend.update(&r, &[r.clone()]).await.unwrap();

        let loaded = backend.load().await.unwrap();
        assert_eq!(loaded, vec![r]);
    }

    #[tokio::test]
    async fn delete_then_load_is_empty() {
        let (_table, backend) = backend();
        let r = record("A");
        backend.insert(&r, &[r.clone()]).await.unwrap();
        backend.delete(r.id, &[]).await.unwrap();

        assert!(backend.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_removes_only_owned_rows() {
        let (table, backend) = backend();
        let foreign = RemoteBackend::new(table.clone(), "bob".to_string());
        let mine = record("MINE");
        let theirs = record("THEIRS");
        backend.insert(&mine, &[mine.clone()]).await.unwrap();
        foreign.insert(&theirs, &[theirs.clone()]).await.unwrap();

        backend.clear().await.unwrap();

        assert!(backend.load().await.unwrap().is_empty());
        assert_eq!(foreign.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn subscribe_receives_own_writes() {
        let (_table, backend) = backend();
        let mut feed = backend.subscribe();
        let r = record("A");
        backend.insert(&r, &[r.clone()]).await.unwrap();

        assert!(matches!(feed.recv().await.unwrap(), ChangeEvent::Insert(_)));
    }
}
