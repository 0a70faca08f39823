//! Derived statistics and the expiring-soon subset.
//!
//! Aggregates are computed over the full list, not a filtered view, and
//! take an explicit `now` for testability.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::query::is_expired;
use crate::record::DiscountCode;

/// How far ahead a record's expiry may lie to count as expiring soon.
pub const EXPIRING_WINDOW_DAYS: i64 = 7;

/// Aggregate counts over the full record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// All records, including archived.
    pub total: usize,
    /// Not expired and not archived.
    pub active: usize,
    /// Expired and not archived.
    pub expired: usize,
    /// Favorites, excluding archived.
    pub favorites: usize,
    /// Archived records.
    pub archived: usize,
    /// Sum of `times_used` across all records.
    pub total_usages: u64,
    /// Records whose expiry falls within the next seven days.
    pub expiring_soon: usize,
}

/// Records that are unarchived, unexpired, and expire within the window.
///
/// A record qualifies when it has an expiry date in `(now, now + 7 days]`
/// (already-expired records are excluded by the unexpired test).
#[must_use]
pub fn expiring_soon(records: &[DiscountCode], now: DateTime<Utc>) -> Vec<DiscountCode> {
    let horizon = now + Duration::days(EXPIRING_WINDOW_DAYS);
    records
        .iter()
        .filter(|record| {
            !record.is_archived
                && !is_expired(record, now)
                && record.expiry_date.is_some_and(|expiry| expiry <= horizon)
        })
        .cloned()
        .collect()
}

/// Computes the aggregate counts over the full list at `now`.
#[must_use]
pub fn stats(records: &[DiscountCode], now: DateTime<Utc>) -> StatsSnapshot {
    let mut snapshot = StatsSnapshot {
        total: records.len(),
        expiring_soon: expiring_soon(records, now).len(),
        ..StatsSnapshot::default()
    };

    for record in records {
        if record.is_archived {
            snapshot.archived += 1;
        } else {
            if is_expired(record, now) {
                snapshot.expired += 1;
            } else {
                snapshot.active += 1;
            }
            if record.is_favorite {
                snapshot.favorites += 1;
            }
        }
        snapshot.total_usages += u64::from(record.times_used);
    }

    snapshot
}
