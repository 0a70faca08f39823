//! Pure filter and sort over a held record list.
//!
//! [`filter_records`] is a pure function of the list, a [`FilterSpec`], and
//! an explicit `now`, so every partition and ordering is unit-testable
//! without touching a clock or a store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::{Category, DiscountCode};

/// Status partition selected by a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusFilter {
    /// Not expired and not archived.
    Active,
    /// Expired and not archived.
    Expired,
    /// Favorite and not archived.
    Favorites,
    /// Archived, regardless of expiry.
    Archived,
    /// Everything except archived records.
    #[default]
    All,
}

/// Sort order applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Store name, lexical ascending.
    Store,
    /// Category name, lexical ascending.
    Category,
    /// Expiry date ascending; records without one sort last.
    ExpiryDate,
    /// Usage count, descending.
    TimesUsed,
    /// Creation time, descending (newest first).
    #[default]
    DateAdded,
}

/// Category constraint of a filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryFilter {
    /// Match every category.
    #[default]
    All,
    /// Match exactly one category.
    Only(Category),
}

/// The `{searchTerm, category, sortBy, filterBy}` tuple the query engine consumes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSpec {
    /// Case-insensitive substring matched against code, store, description,
    /// and category. Empty matches all.
    #[serde(default)]
    pub search_term: String,
    /// Category constraint.
    #[serde(default)]
    pub category: CategoryFilter,
    /// Sort order.
    #[serde(default)]
    pub sort_by: SortBy,
    /// Status partition.
    #[serde(default)]
    pub filter_by: StatusFilter,
}

/// Whether a record is expired at `now`.
///
/// A record with no expiry date never expires; otherwise it is expired
/// exactly when `now` is strictly after the expiry date.
#[must_use]
pub fn is_expired(record: &DiscountCode, now: DateTime<Utc>) -> bool {
    record.expiry_date.is_some_and(|expiry| now > expiry)
}

fn matches_search(record: &DiscountCode, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    record.code.to_lowercase().contains(&term)
        || record.store.to_lowercase().contains(&term)
        || record.description.to_lowercase().contains(&term)
        || record.category.as_str().contains(&term)
}

fn matches_status(record: &DiscountCode, status: StatusFilter, now: DateTime<Utc>) -> bool {
    match status {
        StatusFilter::Active => !is_expired(record, now) && !record.is_archived,
        StatusFilter::Expired => is_expired(record, now) && !record.is_archived,
        StatusFilter::Favorites => record.is_favorite && !record.is_archived,
        StatusFilter::Archived => record.is_archived,
        StatusFilter::All => !record.is_archived,
    }
}

fn compare(a: &DiscountCode, b: &DiscountCode, sort_by: SortBy) -> std::cmp::Ordering {
    match sort_by {
        SortBy::Store => a.store.cmp(&b.store),
        SortBy::Category => a.category.as_str().cmp(b.category.as_str()),
        SortBy::ExpiryDate => match (a.expiry_date, b.expiry_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        },
        SortBy::TimesUsed => b.times_used.cmp(&a.times_used),
        SortBy::DateAdded => b.date_added.cmp(&a.date_added),
    }
}

/// Filters and sorts a record list, evaluated at `now`.
#[must_use]
pub fn filter_records(
    records: &[DiscountCode],
    spec: &FilterSpec,
    now: DateTime<Utc>,
) -> Vec<DiscountCode> {
    let mut matched: Vec<DiscountCode> = records
        .iter()
        .filter(|record| {
            matches_search(record, &spec.search_term)
                && match spec.category {
                    CategoryFilter::All => true,
                    CategoryFilter::Only(category) => record.category == category,
                }
                && matches_status(record, spec.filter_by, now)
        })
        .cloned()
        .collect();
    matched.sort_by(|a, b| compare(a, b, spec.sort_by));
    matched
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::record::{RecordDraft, UsageEntry};

    fn record(code: &str, store: &str, category: Category) -> DiscountCode {
        DiscountCode::from_draft(
            RecordDraft {
                code: code.to_string(),
                store: store.to_string(),
                discount: "10%".to_string(),
                category,
                ..RecordDraft::default()
            },
            Utc::now(),
        )
    }

    #[test]
    fn expired_is_strictly_after_expiry() {
        let now = Utc::now();
        let mut r = record("A", "Acme", Category::Other);

        r.expiry_date = Some(now);
        assert!(!is_expired(&r, now));

        r.expiry_date = Some(now - Duration::seconds(1));
        assert!(is_expired(&r, now));

        r.expiry_date = None;
        assert!(!is_expired(&r, now));
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        let now = Utc::now();
        let records = vec![record("SAVE10", "Acme", Category::Other)];
        let spec = FilterSpec {
            search_term: "acme".to_string(),
            ..FilterSpec::default()
        };
        assert_eq!(filter_records(&records, &spec, now).len(), 1);

        let spec = FilterSpec {
            search_term: "save10".to_string(),
            ..FilterSpec::default()
        };
        assert_eq!(filter_records(&records, &spec, now).len(), 1);

        let spec = FilterSpec {
            search_term: "zz".to_string(),
            ..FilterSpec::default()
        };
        assert!(filter_records(&records, &spec, now).is_empty());
    }

    #[test]
    fn empty_search_matches_all() {
        let now = Utc::now();
        let records = vec![
            record("A", "Acme", Category::Other),
            record("B", "Bcme", Category::Travel),
        ];
        assert_eq!(
            filter_records(&records, &FilterSpec::default(), now).len(),
            2
        );
    }

    #[test]
    fn category_filter_exact_unless_all() {
        let now = Utc::now();
        let records = vec![
            record("A", "Acme", Category::Travel),
            record("B", "Bcme", Category::Other),
        ];
        let spec = FilterSpec {
            category: CategoryFilter::Only(Category::Travel),
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "A");
    }

    #[test]
    fn archived_partition_is_exact_regardless_of_other_axes() {
        let now = Utc::now();
        let mut archived = record("A", "Acme", Category::Other);
        archived.is_archived = true;
        let mut archived_expired = record("B", "Bcme", Category::Other);
        archived_expired.is_archived = true;
        archived_expired.expiry_date = Some(now - Duration::days(1));
        let active = record("C", "Ccme", Category::Other);

        let records = vec![archived, archived_expired, active];
        let spec = FilterSpec {
            filter_by: StatusFilter::Archived,
            sort_by: SortBy::Store,
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.is_archived));
    }

    #[test]
    fn default_partition_excludes_archived() {
        let now = Utc::now();
        let mut archived = record("A", "Acme", Category::Other);
        archived.is_archived = true;
        let records = vec![archived, record("B", "Bcme", Category::Other)];

        let out = filter_records(&records, &FilterSpec::default(), now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "B");
    }

    #[test]
    fn active_and_expired_partition_on_expiry() {
        let now = Utc::now();
        let mut expired = record("E", "Acme", Category::Other);
        expired.expiry_date = Some(now - Duration::days(1));
        let mut live = record("L", "Acme", Category::Other);
        live.expiry_date = Some(now + Duration::days(1));
        let records = vec![expired, live];

        let spec = FilterSpec {
            filter_by: StatusFilter::Active,
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "L");

        let spec = FilterSpec {
            filter_by: StatusFilter::Expired,
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "E");
    }

    #[test]
    fn favorites_partition_excludes_archived() {
        let now = Utc::now();
        let mut fav = record("F", "Acme", Category::Other);
        fav.is_favorite = true;
        let mut archived_fav = record("G", "Acme", Category::Other);
        archived_fav.is_favorite = true;
        archived_fav.is_archived = true;
        let records = vec![fav, archived_fav];

        let spec = FilterSpec {
            filter_by: StatusFilter::Favorites,
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].code, "F");
    }

    #[test]
    fn sort_by_expiry_puts_undated_last() {
        let now = Utc::now();
        let mut soon = record("S", "Acme", Category::Other);
        soon.expiry_date = Some(now + Duration::days(1));
        let mut later = record("L", "Acme", Category::Other);
        later.expiry_date = Some(now + Duration::days(5));
        let undated = record("U", "Acme", Category::Other);

        let records = vec![undated, later, soon];
        let spec = FilterSpec {
            sort_by: SortBy::ExpiryDate,
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        let codes: Vec<&str> = out.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["S", "L", "U"]);
    }

    #[test]
    fn sort_by_times_used_descending() {
        let now = Utc::now();
        let mut heavy = record("H", "Acme", Category::Other);
        heavy.times_used = 9;
        heavy.usage_history = (0..9)
            .map(|_| UsageEntry {
                date: now,
                estimated_savings: None,
            })
            .collect();
        let light = record("L", "Acme", Category::Other);

        let records = vec![light, heavy];
        let spec = FilterSpec {
            sort_by: SortBy::TimesUsed,
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        assert_eq!(out[0].code, "H");
    }

    #[test]
    fn default_sort_is_newest_first() {
        let now = Utc::now();
        let mut old = record("O", "Acme", Category::Other);
        old.date_added = now - Duration::days(3);
        let mut new = record("N", "Acme", Category::Other);
        new.date_added = now;

        let records = vec![old, new];
        let out = filter_records(&records, &FilterSpec::default(), now);
        assert_eq!(out[0].code, "N");
    }

    #[test]
    fn sort_by_store_lexical_ascending() {
        let now = Utc::now();
        let records = vec![
            record("B", "Beta", Category::Other),
            record("A", "Alpha", Category::Other),
        ];
        let spec = FilterSpec {
            sort_by: SortBy::Store,
            ..FilterSpec::default()
        };
        let out = filter_records(&records, &spec, now);
        assert_eq!(out[0].store, "Alpha");
    }
}
