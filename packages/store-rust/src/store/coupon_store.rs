//! The record store: lifecycle, optimistic mutation pipeline, read surface.
//!
//! [`CouponStore`] owns the one shared in-memory list. The mutation
//! pipeline and the realtime merger both write to it; the query engine and
//! aggregator only read it. Exactly one backend is authoritative at a time,
//! selected from the identity signal.
//!
//! # Concurrency
//!
//! Mutations are not serialized against one another: each captures its own
//! snapshot, publishes optimistically, then awaits the durable write. Two
//! mutations in flight at once race on the shared list, and the later
//! snapshot can silently discard the earlier published change. The feed
//! merger interleaves the same way. This is deliberate
//! last-write-observed-wins behavior; see
//! [`transaction`](super::transaction) for the unit-tested hazard.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::Utc;
use couponvault_core::{
    estimate_savings, expiring_soon, filter_records, is_expired, stats, DiscountCode, FilterSpec,
    RecordDraft, RecordPatch, StatsSnapshot, UsageEntry,
};
use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::store::backend::RecordBackend;
use crate::store::backends::{LocalBackend, NullBackend, RemoteBackend};
use crate::store::config::StoreConfig;
use crate::store::error::StoreError;
use crate::store::feed::FeedSubscription;
use crate::store::kv::KeyValueStore;
use crate::store::remote_table::RemoteTable;
use crate::store::selector::{BackendMode, BackendSelector, Identity, IdentitySignal};
use crate::store::transaction::{SharedList, Transaction};

/// The currently authoritative backend.
struct ActiveBackend {
    mode: BackendMode,
    backend: Arc<dyn RecordBackend>,
}

/// Dual-backend discount-code record store.
///
/// Constructed idle: until an identity signal settles, reads see an empty
/// list and writes go to a null backend. [`observe_identity`] runs the
/// load sequence and activates the matching backend;
/// [`teardown`](CouponStore::teardown) returns the store to idle.
///
/// [`observe_identity`]: CouponStore::observe_identity
pub struct CouponStore {
    config: StoreConfig,
    kv: Arc<dyn KeyValueStore>,
    table: Arc<dyn RemoteTable>,
    list: SharedList,
    active: ArcSwapOption<ActiveBackend>,
    selector: Mutex<BackendSelector>,
    feed: Mutex<Option<FeedSubscription>>,
}

impl CouponStore {
    /// Creates an idle store over the two possible persistence seams.
    #[must_use]
    pub fn new(
        config: StoreConfig,
        kv: Arc<dyn KeyValueStore>,
        table: Arc<dyn RemoteTable>,
    ) -> Self {
        Self {
            config,
            kv,
            table,
            list: Arc::new(RwLock::new(Vec::new())),
            active: ArcSwapOption::const_empty(),
            selector: Mutex::new(BackendSelector::new()),
            feed: Mutex::new(None),
        }
    }

    /// The active backend mode, or `None` while idle.
    #[must_use]
    pub fn mode(&self) -> Option<BackendMode> {
        self.active.load().as_ref().map(|active| active.mode)
    }

    /// Feeds the selector; runs the load sequence when it fires.
    ///
    /// Runs exactly once per settled identity and again on every identity
    /// transition, discarding the previously held list each time. Load
    /// failures are logged and leave the list empty, not propagated.
    pub async fn observe_identity(&self, signal: &IdentitySignal) {
        let decision = self.selector.lock().observe(signal);
        if let Some(mode) = decision {
            self.activate(mode, &signal.identity).await;
        }
    }

    /// Releases the feed subscription and returns the store to idle.
    pub fn teardown(&self) {
        *self.feed.lock() = None;
        self.active.store(None);
        self.selector.lock().reset();
        self.list.write().clear();
    }

    async fn activate(&self, mode: BackendMode, identity: &Identity) {
        // Tear down the previous session before the new one becomes visible.
        *self.feed.lock() = None;
        self.list.write().clear();

        let backend: Arc<dyn RecordBackend> = match mode {
            BackendMode::Local => Arc::new(LocalBackend::new(
                Arc::clone(&self.kv),
                self.config.storage_key.clone(),
            )),
            BackendMode::Remote => {
                let owner = identity.owner().unwrap_or_default().to_string();
                let remote = RemoteBackend::new(Arc::clone(&self.table), owner);
                let receiver = remote.subscribe();
                *self.feed.lock() =
                    Some(FeedSubscription::spawn(receiver, Arc::clone(&self.list)));
                Arc::new(remote)
            }
        };

        match backend.load().await.map_err(StoreError::Load) {
            Ok(records) => *self.list.write() = records,
            Err(err) => tracing::warn!(%err, ?mode, "starting with an empty list"),
        }

        self.active.store(Some(Arc::new(ActiveBackend { mode, backend })));
        tracing::info!(?mode, count = self.list.read().len(), "record store loaded");
    }

    fn backend(&self) -> Arc<dyn RecordBackend> {
        self.active
            .load_full()
            .map_or_else(|| Arc::new(NullBackend) as _, |active| Arc::clone(&active.backend))
    }

    // --- Mutation pipeline ---

    /// Creates a record from the draft and persists it.
    ///
    /// The new record is published at the head of the list before the
    /// durable write completes. Returns the record, or `None` if the write
    /// failed and the list was rolled back.
    pub async fn add(&self, draft: RecordDraft) -> Option<DiscountCode> {
        let backend = self.backend();
        let record = DiscountCode::from_draft(draft, Utc::now());

        let tx = Transaction::begin(&self.list);
        let mut next = Vec::with_capacity(tx.snapshot().len() + 1);
        next.push(record.clone());
        next.extend_from_slice(tx.snapshot());
        tx.apply(next.clone());

        match backend.insert(&record, &next).await.map_err(StoreError::Write) {
            Ok(()) => {
                tx.commit();
                Some(record)
            }
            Err(err) => {
                tracing::warn!(%err, record_id = %record.id, "rolling back add");
                tx.rollback();
                None
            }
        }
    }

    /// Shallow-merges a patch into the record with `id`.
    ///
    /// An absent id still round-trips through the snapshot/apply cycle but
    /// writes nothing and does not error.
    pub async fn update(&self, id: Uuid, patch: RecordPatch) {
        let backend = self.backend();

        let tx = Transaction::begin(&self.list);
        let mut updated: Option<DiscountCode> = None;
        let mut next = Vec::with_capacity(tx.snapshot().len());
        for record in tx.snapshot() {
            if record.id == id {
                let mut patched = record.clone();
                patched.apply_patch(patch.clone());
                updated = Some(patched.clone());
                next.push(patched);
            } else {
                next.push(record.clone());
            }
        }
        tx.apply(next.clone());

        let write = match &updated {
            Some(record) => backend.update(record, &next).await,
            None => Ok(()),
        };
        match write.map_err(StoreError::Write) {
            Ok(()) => tx.commit(),
            Err(err) => {
                tracing::warn!(%err, record_id = %id, "rolling back update");
                tx.rollback();
            }
        }
    }

    /// Removes the record with `id`. Deleting an absent id is a no-op.
    pub async fn delete(&self, id: Uuid) {
        let backend = self.backend();

        let tx = Transaction::begin(&self.list);
        let next: Vec<DiscountCode> = tx
            .snapshot()
            .iter()
            .filter(|record| record.id != id)
            .cloned()
            .collect();
        let removed = next.len() != tx.snapshot().len();
        tx.apply(next.clone());

        let write = if removed {
            backend.delete(id, &next).await
        } else {
            Ok(())
        };
        match write.map_err(StoreError::Write) {
            Ok(()) => tx.commit(),
            Err(err) => {
                tracing::warn!(%err, record_id = %id, "rolling back delete");
                tx.rollback();
            }
        }
    }

    /// Flips the favorite flag of the record with `id`.
    pub async fn toggle_favorite(&self, id: Uuid) {
        let flag = self
            .list
            .read()
            .iter()
            .find(|record| record.id == id)
            .map(|record| record.is_favorite);
        if let Some(flag) = flag {
            self.update(
                id,
                RecordPatch {
                    is_favorite: Some(!flag),
                    ..RecordPatch::default()
                },
            )
            .await;
        }
    }

    /// Flips the archived flag of the record with `id`.
    pub async fn toggle_archived(&self, id: Uuid) {
        let flag = self
            .list
            .read()
            .iter()
            .find(|record| record.id == id)
            .map(|record| record.is_archived);
        if let Some(flag) = flag {
            self.update(
                id,
                RecordPatch {
                    is_archived: Some(!flag),
                    ..RecordPatch::default()
                },
            )
            .await;
        }
    }

    /// Records one use of the code with `id`.
    ///
    /// Appends a usage entry (with the savings estimated from the discount
    /// text) and bumps the counter by exactly one, as a single merged
    /// patch, so the history length always equals the counter.
    pub async fn increment_usage(&self, id: Uuid) {
        let now = Utc::now();
        let patch = {
            let list = self.list.read();
            let Some(record) = list.iter().find(|record| record.id == id) else {
                return;
            };
            let savings = estimate_savings(&record.discount, record.original_price);
            let mut history = record.usage_history.clone();
            history.push(UsageEntry {
                date: now,
                estimated_savings: savings,
            });
            RecordPatch {
                times_used: Some(record.times_used + 1),
                usage_history: Some(history),
                ..RecordPatch::default()
            }
        };
        self.update(id, patch).await;
    }

    /// Empties the collection and bulk-clears the backing store.
    pub async fn clear(&self) {
        let backend = self.backend();

        let tx = Transaction::begin(&self.list);
        tx.apply(Vec::new());

        match backend.clear().await.map_err(StoreError::Write) {
            Ok(()) => tx.commit(),
            Err(err) => {
                tracing::warn!(%err, "rolling back clear");
                tx.rollback();
            }
        }
    }

    // --- Read surface ---

    /// A copy of the held list.
    #[must_use]
    pub fn records(&self) -> Vec<DiscountCode> {
        self.list.read().clone()
    }

    /// Whether `record` is expired right now.
    #[must_use]
    pub fn is_expired(&self, record: &DiscountCode) -> bool {
        is_expired(record, Utc::now())
    }

    /// Filters and sorts the held list.
    #[must_use]
    pub fn filter(&self, spec: &FilterSpec) -> Vec<DiscountCode> {
        filter_records(&self.list.read(), spec, Utc::now())
    }

    /// Unarchived, unexpired records expiring within the next seven days.
    #[must_use]
    pub fn expiring_soon(&self) -> Vec<DiscountCode> {
        expiring_soon(&self.list.read(), Utc::now())
    }

    /// Aggregate counts over the full held list.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        stats(&self.list.read(), Utc::now())
    }
}
