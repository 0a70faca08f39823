//! Discount-code record types: the sole entity of the collection.
//!
//! Defines [`DiscountCode`] plus the input shapes that produce and mutate it:
//! [`RecordDraft`] (the add-form payload) and [`RecordPatch`] (a typed
//! shallow-merge partial update). `id` and `date_added` are deliberately
//! absent from [`RecordPatch`] so they cannot change after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed category set a record belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    /// Groceries and supermarkets.
    Groceries,
    /// Clothing and apparel.
    Clothing,
    /// Electronics and gadgets.
    Electronics,
    /// Restaurants and food delivery.
    Restaurants,
    /// Travel, flights, and hotels.
    Travel,
    /// Entertainment and streaming.
    Entertainment,
    /// Health and beauty.
    Health,
    /// Everything else.
    #[default]
    Other,
}

impl Category {
    /// Canonical lowercase name, as used in serialized payloads and search.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Groceries => "groceries",
            Self::Clothing => "clothing",
            Self::Electronics => "electronics",
            Self::Restaurants => "restaurants",
            Self::Travel => "travel",
            Self::Entertainment => "entertainment",
            Self::Health => "health",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a known [`Category`].
#[derive(Debug, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(String);

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "groceries" => Ok(Self::Groceries),
            "clothing" => Ok(Self::Clothing),
            "electronics" => Ok(Self::Electronics),
            "restaurants" => Ok(Self::Restaurants),
            "travel" => Ok(Self::Travel),
            "entertainment" => Ok(Self::Entertainment),
            "health" => Ok(Self::Health),
            "other" => Ok(Self::Other),
            other => Err(CategoryParseError(other.to_string())),
        }
    }
}

/// One recorded use of a discount code.
///
/// Appended to [`DiscountCode::usage_history`] on every usage increment;
/// the history is append-only and its length always equals `times_used`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntry {
    /// When the code was used.
    pub date: DateTime<Utc>,
    /// Estimated savings for this use, when derivable from the discount text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_savings: Option<f64>,
}

impl UsageEntry {
    /// Serializes a usage history to the JSON blob stored in the remote row.
    ///
    /// Serialization of these types cannot fail; an empty-array fallback
    /// keeps the signature infallible.
    #[must_use]
    pub fn history_to_json(entries: &[UsageEntry]) -> String {
        serde_json::to_string(entries).unwrap_or_else(|_| "[]".to_string())
    }

    /// Deserializes a usage-history JSON blob.
    ///
    /// Malformed blobs yield an empty history rather than an error, matching
    /// the corrupt-cache policy of the load path.
    #[must_use]
    pub fn history_from_json(blob: &str) -> Vec<UsageEntry> {
        serde_json::from_str(blob).unwrap_or_else(|err| {
            tracing::warn!(%err, "malformed usage history blob, treating as empty");
            Vec::new()
        })
    }
}

/// A single discount-code record.
///
/// Timestamps serialize as ISO-8601 strings (RFC 3339) so the local
/// fixed-key payload and the remote row round-trip dates exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCode {
    /// Globally unique id, assigned at creation and never changed.
    pub id: Uuid,
    /// The code itself, trimmed.
    pub code: String,
    /// Store or merchant name, trimmed.
    pub store: String,
    /// Free-form discount text ("10%", "€5").
    pub discount: String,
    /// Original price, used to compute percentage savings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// When the code expires, if it expires at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Category from the fixed set.
    pub category: Category,
    /// Optional free-form description.
    #[serde(default)]
    pub description: String,
    /// Whether the user marked this record as a favorite.
    #[serde(default)]
    pub is_favorite: bool,
    /// Whether the record is archived (hidden from active views).
    #[serde(default)]
    pub is_archived: bool,
    /// When the record was created. Set once, never mutated.
    pub date_added: DateTime<Utc>,
    /// How many times the code has been used. Monotonically non-decreasing.
    #[serde(default)]
    pub times_used: u32,
    /// Append-only usage log. Its length always equals `times_used`.
    #[serde(default)]
    pub usage_history: Vec<UsageEntry>,
}

impl DiscountCode {
    /// Builds a new record from an add-form draft.
    ///
    /// Generates a fresh v4 id, trims the string fields, parses the optional
    /// free-form price and expiry strings (unparsable input is discarded as
    /// `None`), and initializes the usage counters to zero.
    #[must_use]
    pub fn from_draft(draft: RecordDraft, now: DateTime<Utc>) -> Self {
        let original_price = draft.original_price.as_deref().and_then(|raw| {
            let parsed = raw.trim().parse::<f64>().ok();
            if parsed.is_none() {
                tracing::debug!(raw, "unparsable original price in draft, ignoring");
            }
            parsed
        });
        let expiry_date = draft.expiry_date.as_deref().and_then(|raw| {
            let parsed = raw
                .trim()
                .parse::<DateTime<Utc>>()
                .ok()
                .or_else(|| parse_date_only(raw.trim()));
            if parsed.is_none() {
                tracing::debug!(raw, "unparsable expiry date in draft, ignoring");
            }
            parsed
        });

        Self {
            id: Uuid::new_v4(),
            code: draft.code.trim().to_string(),
            store: draft.store.trim().to_string(),
            discount: draft.discount.trim().to_string(),
            original_price,
            expiry_date,
            category: draft.category,
            description: draft.description.trim().to_string(),
            is_favorite: false,
            is_archived: false,
            date_added: now,
            times_used: 0,
            usage_history: Vec::new(),
        }
    }

    /// Shallow-merges a patch into this record.
    ///
    /// Fields absent from the patch are preserved. `id` and `date_added`
    /// have no patch slot and therefore cannot change here.
    pub fn apply_patch(&mut self, patch: RecordPatch) {
        if let Some(code) = patch.code {
            self.code = code;
        }
        if let Some(store) = patch.store {
            self.store = store;
        }
        if let Some(discount) = patch.discount {
            self.discount = discount;
        }
        if let Some(original_price) = patch.original_price {
            self.original_price = Some(original_price);
        }
        if let Some(expiry_date) = patch.expiry_date {
            self.expiry_date = Some(expiry_date);
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
        if let Some(times_used) = patch.times_used {
            self.times_used = times_used;
        }
        if let Some(usage_history) = patch.usage_history {
            self.usage_history = usage_history;
        }
    }
}

/// Parses `YYYY-MM-DD` form inputs as midnight UTC.
fn parse_date_only(raw: &str) -> Option<DateTime<Utc>> {
    let date = raw.parse::<chrono::NaiveDate>().ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

/// Add-form payload for creating a record.
///
/// Price and expiry arrive as free-form strings straight from the form;
/// [`DiscountCode::from_draft`] parses them and silently drops garbage.
#[derive(Debug, Clone, Default)]
pub struct RecordDraft {
    /// The discount code text.
    pub code: String,
    /// Store or merchant name.
    pub store: String,
    /// Free-form discount text.
    pub discount: String,
    /// Category from the fixed set.
    pub category: Category,
    /// Optional description.
    pub description: String,
    /// Optional original price, as typed.
    pub original_price: Option<String>,
    /// Optional expiry date, as typed (RFC 3339 or `YYYY-MM-DD`).
    pub expiry_date: Option<String>,
}

/// Typed shallow-merge patch for [`DiscountCode`].
///
/// Each `Some` field overwrites the corresponding record field; `None`
/// leaves it untouched. Unknown fields cannot exist by construction, and
/// neither `id` nor `date_added` is patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPatch {
    /// New code text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// New store name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<String>,
    /// New discount text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    /// New original price.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    /// New expiry date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    /// New category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New favorite flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    /// New archived flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
    /// New usage count. Paired with `usage_history` by the usage pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub times_used: Option<u32>,
    /// Replacement usage history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_history: Option<Vec<UsageEntry>>,
}
