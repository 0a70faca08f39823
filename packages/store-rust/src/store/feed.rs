//! Realtime merger: applies change-feed events onto the shared list.
//!
//! Feed events and locally-originated optimistic mutations write to the
//! same list with no ordering coordination beyond last-write-observed-wins.
//! The merger only dedups inserts, guarding against double-insertion when
//! the local optimistic copy landed before its own feed echo arrived.

use couponvault_core::DiscountCode;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::store::remote_table::ChangeEvent;
use crate::store::transaction::SharedList;

/// Applies one feed event to the held list.
///
/// - Insert: prepend, unless a record with the same id already exists.
/// - Update: replace the record sharing the id wholesale.
/// - Delete: remove the record with the id.
pub fn apply_change(list: &mut Vec<DiscountCode>, event: ChangeEvent) {
    match event {
        ChangeEvent::Insert(row) => {
            let record = row.into_record();
            if !list.iter().any(|existing| existing.id == record.id) {
                list.insert(0, record);
            }
        }
        ChangeEvent::Update(row) => {
            let record = row.into_record();
            if let Some(slot) = list.iter_mut().find(|existing| existing.id == record.id) {
                *slot = record;
            }
        }
        ChangeEvent::Delete(id) => {
            list.retain(|existing| existing.id != id);
        }
    }
}

/// Handle for the task draining a change feed into a [`SharedList`].
///
/// The task runs until the feed closes or the handle is dropped; dropping
/// releases the subscription (identity change, store teardown).
#[derive(Debug)]
pub struct FeedSubscription {
    handle: JoinHandle<()>,
}

impl FeedSubscription {
    /// Spawns the merger task over `receiver`, writing into `list`.
    #[must_use]
    pub fn spawn(mut receiver: broadcast::Receiver<ChangeEvent>, list: SharedList) -> Self {
        let handle = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        apply_change(&mut list.write(), event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // Convergence resumes with the next event; the
                        // skipped ones are simply never observed.
                        tracing::warn!(skipped, "change feed lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("change feed closed");
                        break;
                    }
                }
            }
        });
        Self { handle }
    }
}

impl Drop for FeedSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::Utc;
    use couponvault_core::RecordDraft;
    use parking_lot::RwLock;

    use super::*;
    use crate::store::remote_table::RecordRow;

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

    fn row(record: &DiscountCode) -> RecordRow {
        RecordRow::from_record("alice", record)
    }

    #[test]
    fn insert_prepends_new_record() {
        let existing = record("OLD");
        let incoming = record("NEW");
        let mut list = vec![existing];

        apply_change(&mut list, ChangeEvent::Insert(row(&incoming)));

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].code, "NEW");
    }

    #[test]
    fn insert_dedupes_against_optimistic_copy() {
        // The locally-inserted copy is already in the list when its feed
        // echo arrives.
        let optimistic = record("MINE");
        let mut list = vec![optimistic.clone()];

        apply_change(&mut list, ChangeEvent::Insert(row(&optimistic)));

        assert_eq!(list.len(), 1);
    }

    #[test]
    fn update_replaces_wholesale() {
        let mut local = record("A");
        local.description = "local edit".to_string();
        let mut incoming = local.clone();
        incoming.description = String::new();
        incoming.is_favorite = true;

        let mut list = vec![local];
        apply_change(&mut list, ChangeEvent::Update(row(&incoming)));

        assert_eq!(list[0], incoming);
    }

    #[test]
    fn update_for_unknown_id_is_noop() {
        let mut list = vec![record("A")];
        apply_change(&mut list, ChangeEvent::Update(row(&record("GHOST"))));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].code, "A");
    }

    #[test]
    fn delete_removes_matching_id_only() {
        let keep = record("KEEP");
        let drop_me = record("DROP");
        let mut list = vec![keep.clone(), drop_me.clone()];

        apply_change(&mut list, ChangeEvent::Delete(drop_me.id));
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, keep.id);

        // Idempotent against an already-removed id.
        apply_change(&mut list, ChangeEvent::Delete(drop_me.id));
        assert_eq!(list.len(), 1);
    }

    #[tokio::test]
    async fn subscription_task_merges_events() {
        let (sender, receiver) = broadcast::channel(8);
        let list: SharedList = Arc::new(RwLock::new(Vec::new()));
        let subscription = FeedSubscription::spawn(receiver, Arc::clone(&list));

        let incoming = record("FED");
        sender.send(ChangeEvent::Insert(row(&incoming))).unwrap();

        // The merger task runs as an independent callback stream; give it
        // a moment to observe the event.
        for _ in 0..50 {
            if !list.read().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        assert_eq!(list.read().len(), 1);

        drop(subscription);
    }

    #[tokio::test]
    async fn dropping_subscription_releases_the_feed() {
        let (sender, receiver) = broadcast::channel(8);
        let list: SharedList = Arc::new(RwLock::new(Vec::new()));
        let subscription = FeedSubscription::spawn(receiver, Arc::clone(&list));
        drop(subscription);

        // With the task aborted, later events never reach the list.
        let incoming = record("LATE");
        let _ = sender.send(ChangeEvent::Insert(row(&incoming)));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(list.read().is_empty());
    }
}
