//! `CouponVault` core: discount-code record model, query engine, and aggregator.

pub mod query;
pub mod record;
pub mod savings;
pub mod stats;

pub use query::{filter_records, is_expired, CategoryFilter, FilterSpec, SortBy, StatusFilter};
pub use record::{Category, DiscountCode, RecordDraft, RecordPatch, UsageEntry};
pub use savings::estimate_savings;
pub use stats::{expiring_soon, stats, StatsSnapshot};
