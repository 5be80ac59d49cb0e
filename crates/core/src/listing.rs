//! Shareable list/map filter state and client-side ordering.
//!
//! Filters arrive as URL query parameters, are validated against the loaded
//! category set, and are written back in canonical form so the address bar
//! always reflects what is actually applied.

use std::cmp::Ordering;

use serde::Deserialize;
use url::form_urlencoded;

use crate::marker::GroupType;
use crate::rating::RatingBucket;
use crate::types::{CategoryId, MarkerId, Timestamp};
use crate::vote::VoteValue;

/// Number of newest markers shown on the home page.
pub const RECENT_LIMIT: usize = 10;

/// Category chips per row in the home page cravings split.
pub const CRAVING_CHIP_LIMIT: usize = 5;

/// Quick category chips above the map.
pub const MAP_QUICK_CHIP_LIMIT: usize = 4;

/// Which categories a page offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryScope {
    #[default]
    All,
    Places,
    Products,
}

// ---------------------------------------------------------------------------
// List page
// ---------------------------------------------------------------------------

/// Raw list page query (`?type=&category=&min_rating=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<String>,
}

/// Validated list filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub group_type: Option<GroupType>,
    pub category_id: Option<CategoryId>,
    pub min_rating: Option<VoteValue>,
}

impl ListFilter {
    /// Validate raw parameters. Unknown categories, unknown types and
    /// ratings outside 1–10 are dropped rather than rejected.
    pub fn from_params<F>(params: &ListParams, is_known_category: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        Self {
            group_type: params.group_type.as_deref().and_then(GroupType::parse),
            category_id: known_category(params.category.as_deref(), is_known_category),
            min_rating: params
                .min_rating
                .as_deref()
                .and_then(|s| s.trim().parse::<i64>().ok())
                .and_then(|n| VoteValue::new(n).ok()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.group_type.is_none() && self.category_id.is_none() && self.min_rating.is_none()
    }

    /// Canonical query string without the leading `?`. Empty when no filter applies.
    pub fn to_query_string(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        if let Some(t) = self.group_type {
            ser.append_pair("type", t.as_str());
        }
        if let Some(c) = &self.category_id {
            ser.append_pair("category", c);
        }
        if let Some(r) = self.min_rating {
            ser.append_pair("min_rating", &r.to_string());
        }
        ser.finish()
    }
}

// ---------------------------------------------------------------------------
// Map page
// ---------------------------------------------------------------------------

/// Raw map page query (`?category=&rating=&focus=`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapParams {
    pub category: Option<String>,
    pub rating: Option<String>,
    pub focus: Option<String>,
}

/// Validated map filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapFilter {
    pub category_id: Option<CategoryId>,
    pub rating_bucket: Option<RatingBucket>,
    /// Marker to select and centre on after loading.
    pub focus: Option<MarkerId>,
}

impl MapFilter {
    pub fn from_params<F>(params: &MapParams, is_known_category: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        Self {
            category_id: known_category(params.category.as_deref(), is_known_category),
            rating_bucket: params.rating.as_deref().and_then(RatingBucket::parse_key),
            focus: params
                .focus
                .as_deref()
                .and_then(|s| MarkerId::parse_str(s.trim()).ok()),
        }
    }

    /// Whether any narrowing filter is set (the "Clear" chip shows only then).
    pub fn has_filters(&self) -> bool {
        self.category_id.is_some() || self.rating_bucket.is_some()
    }

    pub fn to_query_string(&self) -> String {
        let mut ser = form_urlencoded::Serializer::new(String::new());
        if let Some(c) = &self.category_id {
            ser.append_pair("category", c);
        }
        if let Some(key) = self.rating_bucket.and_then(RatingBucket::key) {
            ser.append_pair("rating", key);
        }
        if let Some(f) = self.focus {
            ser.append_pair("focus", &f.to_string());
        }
        ser.finish()
    }
}

fn known_category<F>(raw: Option<&str>, is_known: F) -> Option<CategoryId>
where
    F: Fn(&str) -> bool,
{
    raw.map(str::trim)
        .filter(|s| !s.is_empty() && is_known(s))
        .map(ToString::to_string)
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Rows that can be ordered by rating and title.
pub trait Ranked {
    fn average(&self) -> Option<f64>;
    fn sort_title(&self) -> &str;
}

/// Case-insensitive first, then exact, so "apple" and "Apple" sit together.
fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn compare_avg_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}

/// List page order: average descending (missing counts as 0), then title ascending.
pub fn sort_by_rating_then_title<T: Ranked>(rows: &mut [T]) {
    rows.sort_by(|a, b| {
        compare_avg_desc(a.average(), b.average())
            .then_with(|| compare_titles(a.sort_title(), b.sort_title()))
    });
}

/// Products page order: average descending only, stable otherwise.
pub fn sort_by_rating_desc<T: Ranked>(rows: &mut [T]) {
    rows.sort_by(|a, b| compare_avg_desc(a.average(), b.average()));
}

/// Newest first. Rows without a timestamp go last.
pub fn sort_recent<T, F>(rows: &mut [T], created_at: F)
where
    F: Fn(&T) -> Option<Timestamp>,
{
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}
