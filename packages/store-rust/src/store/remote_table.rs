//! Remote relational seam: owner-scoped rows and the change feed.
//!
//! Defines [`RemoteTable`], the abstraction over the multi-user relational
//! backend (one table keyed by id with an owner column), [`RecordRow`] (the
//! conceptual row, `usageHistory` stored as a JSON blob), and
//! [`ChangeEvent`] (the insert/update/delete feed payload).
//!
//! [`MemoryRemoteTable`] is the in-process implementation used by tests and
//! local development; it emits a feed event for every committed write.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use couponvault_core::{Category, DiscountCode, UsageEntry};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Feed buffer per owner. A lagging consumer drops oldest events.
const FEED_CAPACITY: usize = 64;

/// One row of the remote discount-code table.
///
/// Mirrors the entity fields column-for-column, plus the `owner` column the
/// table is scoped by. `usage_history` is a JSON blob, not a relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordRow {
    /// Primary key.
    pub id: Uuid,
    /// Owning identity.
    pub owner: String,
    /// The code text.
    pub code: String,
    /// Store or merchant name.
    pub store: String,
    /// Free-form discount text.
    pub discount: String,
    /// Original price, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// Expiry date, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Category.
    pub category: Category,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Favorite flag.
    #[serde(default)]
    pub is_favorite: bool,
    /// Archived flag.
    #[serde(default)]
    pub is_archived: bool,
    /// Creation time.
    pub date_added: DateTime<Utc>,
    /// Usage count.
    #[serde(default)]
    pub times_used: u32,
    /// Usage history as a JSON blob.
    #[serde(default)]
    pub usage_history: String,
}

impl RecordRow {
    /// Builds a row for `owner` from a record.
    #[must_use]
    pub fn from_record(owner: &str, record: &DiscountCode) -> Self {
        Self {
            id: record.id,
            owner: owner.to_string(),
            code: record.code.clone(),
            store: record.store.clone(),
            discount: record.discount.clone(),
            original_price: record.original_price,
            expiry_date: record.expiry_date,
            category: record.category,
            description: record.description.clone(),
            is_favorite: record.is_favorite,
            is_archived: record.is_archived,
            date_added: record.date_added,
            times_used: record.times_used,
            usage_history: UsageEntry::history_to_json(&record.usage_history),
        }
    }

    /// Converts the row back into a record, dropping the owner column.
    #[must_use]
    pub fn into_record(self) -> DiscountCode {
        DiscountCode {
            id: self.id,
            code: self.code,
            store: self.store,
            discount: self.discount,
            original_price: self.original_price,
            expiry_date: self.expiry_date,
            category: self.category,
            description: self.description,
            is_favorite: self.is_favorite,
            is_archived: self.is_archived,
            date_added: self.date_added,
            times_used: self.times_used,
            usage_history: UsageEntry::history_from_json(&self.usage_history),
        }
    }
}

/// One change-feed event, scoped to an owner's rows.
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// A row was inserted.
    Insert(RecordRow),
    /// A row was replaced.
    Update(RecordRow),
    /// The row with this id was deleted.
    Delete(Uuid),
}

/// Owner-scoped CRUD plus the change-feed subscription.
///
/// Used as `Arc<dyn RemoteTable>`. Reconnecting a disrupted feed is the
/// implementation's concern, not this layer's.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// All rows owned by `owner`, ordered by `date_added` descending.
    async fn select_owned(&self, owner: &str) -> anyhow::Result<Vec<RecordRow>>;

    /// Insert a row.
    async fn insert(&self, row: RecordRow) -> anyhow::Result<()>;

    /// Replace the row sharing the incoming id. Absent ids update nothing.
    async fn update(&self, row: RecordRow) -> anyhow::Result<()>;

    /// Delete the row with `id` if `owner` owns it. Idempotent.
    async fn delete(&self, owner: &str, id: Uuid) -> anyhow::Result<()>;

    /// Subscribe to the change feed for `owner`'s rows.
    fn subscribe(&self, owner: &str) -> broadcast::Receiver<ChangeEvent>;
}

/// In-process [`RemoteTable`] backed by [`DashMap`], one broadcast feed per
/// owner.
///
/// Every committed write emits the matching [`ChangeEvent`], including
/// writes made by the same client, so the merger's insert dedup path is
/// exercised exactly as it is against the real backend.
#[derive(Default)]
pub struct MemoryRemoteTable {
    rows: DashMap<Uuid, RecordRow>,
    feeds: DashMap<String, broadcast::Sender<ChangeEvent>>,
}

impl MemoryRemoteTable {
    /// Creates a new, empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(&self, owner: &str, event: ChangeEvent) {
        if let Some(sender) = self.feeds.get(owner) {
            // Send errors mean no live subscribers; the write still stands.
            let _ = sender.send(event);
        }
    }
}

#[async_trait]
impl RemoteTable for MemoryRemoteTable {
    async fn select_owned(&self, owner: &str) -> anyhow::Result<Vec<RecordRow>> {
        let mut rows: Vec<RecordRow> = self
            .rows
            .iter()
            .filter(|entry| entry.value().owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| b.date_added.cmp(&a.date_added));
        Ok(rows)
    }

    async fn insert(&self, row: RecordRow) -> anyhow::Result<()> {
        let owner = row.owner.clone();
        self.rows.insert(row.id, row.clone());
        self.emit(&owner, ChangeEvent::Insert(row));
        Ok(())
    }

    async fn update(&self, row: RecordRow) -> anyhow::Result<()> {
        // Matching the relational semantics: updating an absent id affects
        // zero rows and succeeds.
        if let Some(mut existing) = self.rows.get_mut(&row.id) {
            if existing.owner == row.owner {
                *existing = row.clone();
                drop(existing);
                let owner = row.owner.clone();
                self.emit(&owner, ChangeEvent::Update(row));
            }
        }
        Ok(())
    }

    async fn delete(&self, owner: &str, id: Uuid) -> anyhow::Result<()> {
        let removed = self
            .rows
            .remove_if(&id, |_, row| row.owner == owner)
            .is_some();
        if removed {
            self.emit(owner, ChangeEvent::Delete(id));
        }
        Ok(())
    }

    fn subscribe(&self, owner: &str) -> broadcast::Receiver<ChangeEvent> {
        self.feeds
            .entry(owner.to_string())
            .or_insert_with(|| broadcast::channel(FEED_CAPACITY).0)
            .subscribe()
    }
}
