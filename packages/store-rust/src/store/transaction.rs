//! Explicit optimistic transaction over the shared record list.
//!
//! Every mutation follows the same protocol: snapshot, compute the next
//! list, publish it optimistically, attempt the durable write, then
//! [`commit`](Transaction::commit) or [`rollback`](Transaction::rollback).
//! Making the snapshot a first-class value (rather than closure state)
//! makes the protocol and its known race unit-testable.
//!
//! # Overlapping transactions
//!
//! Transactions are NOT mutually excluded. Each one snapshots
//! independently, so of two transactions begun before either publishes,
//! the later `apply` silently discards the earlier published change
//! (last-writer-wins). The same applies to a rollback racing a feed merge.
//! This mirrors the intended behavior of the layer; see the concurrency
//! notes on [`CouponStore`](super::coupon_store::CouponStore).

use std::sync::Arc;

use couponvault_core::DiscountCode;
use parking_lot::RwLock;

/// The one in-memory list both the mutation pipeline and the realtime
/// merger write to.
pub type SharedList = Arc<RwLock<Vec<DiscountCode>>>;

/// A snapshot-and-rollback transaction against a [`SharedList`].
///
/// Dropping a transaction without resolving it leaves the published
/// optimistic state standing; call sites must commit or roll back
/// explicitly.
#[derive(Debug)]
pub struct Transaction {
    list: SharedList,
    snapshot: Vec<DiscountCode>,
}

impl Transaction {
    /// Begins a transaction by snapshotting the current list.
    #[must_use]
    pub fn begin(list: &SharedList) -> Self {
        let snapshot = list.read().clone();
        Self {
            list: Arc::clone(list),
            snapshot,
        }
    }

    /// The list as it was when the transaction began.
    #[must_use]
    pub fn snapshot(&self) -> &[DiscountCode] {
        &self.snapshot
    }

    /// Publishes `next` as the observable state before durability is
    /// confirmed (the optimistic apply).
    pub fn apply(&self, next: Vec<DiscountCode>) {
        *self.list.write() = next;
    }

    /// Finalizes the transaction; the published state stands.
    pub fn commit(self) {}

    /// Restores the published state to the snapshot, exactly.
    pub fn rollback(self) {
        *self.list.write() = self.snapshot;
    }
}
