//! Marker rows and write DTOs.

use serde::{Deserialize, Serialize};
use tba_core::listing::Ranked;
use tba_core::marker::{self as rules, GroupType};
use tba_core::rating::RatingBucket;
use tba_core::spotlight::SpotlightCandidate;
use tba_core::types::{BrandId, CategoryId, MarkerId, Timestamp};
use validator::{Validate, ValidationError};

use super::ids::{null_as_default, opt_text_id};

/// A row from the `markers` table.
///
/// `rating_avg` and `rating_count` are maintained by the store from the
/// `votes` table and are never written from here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: MarkerId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub group_type: GroupType,
    #[serde(default, deserialize_with = "opt_text_id")]
    pub category_id: Option<CategoryId>,
    #[serde(default, deserialize_with = "opt_text_id")]
    pub brand_id: Option<BrandId>,
    /// Legacy single rating, set to the creator's vote.
    #[serde(default)]
    pub rating_manual: Option<f64>,
    #[serde(default)]
    pub rating_avg: Option<f64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating_count: i64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

fn default_true() -> bool {
    true
}

impl Marker {
    pub fn bucket(&self) -> RatingBucket {
        RatingBucket::classify(self.rating_avg, self.rating_count)
    }

    /// Both coordinates, when the marker has a position.
    pub fn position(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }

    pub fn is_place(&self) -> bool {
        self.group_type == GroupType::Place
    }
}

impl Ranked for Marker {
    fn average(&self) -> Option<f64> {
        self.rating_avg
    }

    fn sort_title(&self) -> &str {
        &self.title
    }
}

impl SpotlightCandidate for Marker {
    fn candidate_id(&self) -> MarkerId {
        self.id
    }

    fn rating_count(&self) -> i64 {
        self.rating_count
    }
}

fn rule_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

fn non_blank(value: &str) -> Result<(), ValidationError> {
    rules::validate_title(value).map_err(|m| rule_error("title", m))
}

fn coordinates_pair(input: &CreatePlace) -> Result<(), ValidationError> {
    rules::validate_coordinates(input.lat, input.lon).map_err(|m| rule_error("coordinates", m))
}

fn coordinates_pair_update(input: &UpdateMarker) -> Result<(), ValidationError> {
    rules::validate_coordinates(input.lat, input.lon).map_err(|m| rule_error("coordinates", m))
}

fn product_brand(input: &CreateProduct) -> Result<(), ValidationError> {
    rules::validate_product_brand(Some(&input.brand_id)).map_err(|m| rule_error("brand_id", m))
}

/// DTO for creating a place.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "coordinates_pair"))]
pub struct CreatePlace {
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category_id: CategoryId,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// The creator's vote, also stored as the legacy `rating_manual`.
    pub rating_manual: Option<f64>,
}

/// DTO for creating a product. Products are keyed by (category, brand).
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "product_brand"))]
pub struct CreateProduct {
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub rating_manual: Option<f64>,
}

/// Full editable field set. Every field is written; absent optionals clear
/// the stored value.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "coordinates_pair_update"))]
pub struct UpdateMarker {
    #[validate(custom(function = "non_blank"))]
    pub title: String,
    #[validate(length(min = 1, message = "Category is required."))]
    pub category_id: CategoryId,
    #[serde(default)]
    pub brand_id: Option<BrandId>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl CreatePlace {
    /// Trim text fields; a blank address becomes `None`.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.category_id = self.category_id.trim().to_string();
        self.address = blank_to_none(self.address);
        self
    }
}

impl CreateProduct {
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.category_id = self.category_id.trim().to_string();
        self.brand_id = self.brand_id.trim().to_string();
        self
    }
}

impl UpdateMarker {
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.category_id = self.category_id.trim().to_string();
        self.brand_id = blank_to_none(self.brand_id);
        self.address = blank_to_none(self.address);
        self
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
