//! Write flows shared by the JSON API and the page forms.
//!
//! Each flow validates its input, checks the referenced rows, and performs
//! the writes in order. Nothing is rolled back: when the creator's vote fails
//! after the marker was inserted, the marker stays and the failure is
//! reported next to it.

use serde::{Deserialize, Serialize};
use tba_core::error::CoreError;
use tba_core::marker::validate_product_brand;
use tba_core::types::{MarkerId, UserId};
use tba_core::vote::{VoteState, VoteValue};
use tba_db::models::marker::{CreatePlace, CreateProduct, Marker, UpdateMarker};
use tba_db::models::vote::Vote;
use tba_db::repositories::{BrandRepo, CategoryRepo, MarkerRepo, ProductOutcome, VoteRepo};
use tba_db::RowStore;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Body of `POST /api/v1/places`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlace {
    pub title: String,
    pub category_id: String,
    #[serde(default)]
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// The creator's own vote.
    #[serde(default)]
    pub vote: VoteValue,
}

/// Body of `POST /api/v1/products`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub title: String,
    pub category_id: String,
    pub brand_id: String,
    #[serde(default)]
    pub vote: VoteValue,
}

/// A freshly inserted marker.
#[derive(Debug, Clone, Serialize)]
pub struct Created {
    pub marker: Marker,
    /// Set when the marker was saved but the creator's vote was not.
    pub vote_error: Option<String>,
}

/// Result of adding a product.
#[derive(Debug, Clone)]
pub enum ProductCreated {
    New(Created),
    /// A product with the same category and brand already exists.
    Existing(MarkerId),
}

fn invalid(message: &str) -> AppError {
    AppError::Core(CoreError::Validation(message.to_string()))
}

/// Insert a place and record the creator's vote.
pub async fn create_place(
    store: &dyn RowStore,
    user_id: UserId,
    input: NewPlace,
) -> AppResult<Created> {
    let dto = CreatePlace {
        title: input.title,
        category_id: input.category_id,
        address: input.address,
        lat: input.lat,
        lon: input.lon,
        rating_manual: Some(f64::from(input.vote.get())),
    }
    .normalized();
    dto.validate()?;

    if dto.lat.is_none() {
        return Err(invalid("Click the map to pick a location first."));
    }
    match CategoryRepo::find_by_id(store, &dto.category_id).await? {
        Some(c) if c.is_active && c.for_places => {}
        _ => return Err(invalid("Pick a place category.")),
    }

    let marker = MarkerRepo::create_place(store, &dto).await?;
    tracing::info!(marker_id = %marker.id, user_id = %user_id, "Place created");

    let vote_error = creator_vote(store, &marker, user_id, input.vote).await;
    Ok(Created { marker, vote_error })
}

/// Insert a product unless its (category, brand) pair exists, and record
/// the creator's vote on a new one.
pub async fn create_product(
    store: &dyn RowStore,
    user_id: UserId,
    input: NewProduct,
) -> AppResult<ProductCreated> {
    let dto = CreateProduct {
        title: input.title,
        category_id: input.category_id,
        brand_id: input.brand_id,
        rating_manual: Some(f64::from(input.vote.get())),
    }
    .normalized();
    dto.validate()?;

    match CategoryRepo::find_by_id(store, &dto.category_id).await? {
        Some(c) if c.is_active && c.for_products => {}
        _ => return Err(invalid("Pick a product category.")),
    }
    match BrandRepo::find_by_id(store, &dto.brand_id).await? {
        Some(b) if b.is_active => {}
        _ => return Err(invalid("Brand is required.")),
    }

    match MarkerRepo::create_product(store, &dto).await? {
        ProductOutcome::Existing(id) => {
            tracing::info!(marker_id = %id, "Product exists, redirecting");
            Ok(ProductCreated::Existing(id))
        }
        ProductOutcome::Created(marker) => {
            tracing::info!(marker_id = %marker.id, user_id = %user_id, "Product created");
            let vote_error = creator_vote(store, &marker, user_id, input.vote).await;
            Ok(ProductCreated::New(Created { marker, vote_error }))
        }
    }
}

async fn creator_vote(
    store: &dyn RowStore,
    marker: &Marker,
    user_id: UserId,
    vote: VoteValue,
) -> Option<String> {
    match VoteRepo::save(store, marker.id, user_id, vote).await {
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(marker_id = %marker.id, error = %e, "Creator vote failed");
            let noun = if marker.is_place() { "Place" } else { "Product" };
            Some(format!("{noun} saved ✅ but vote failed: {e}"))
        }
    }
}

/// An active marker, or the error explaining why it cannot be changed.
async fn editable(store: &dyn RowStore, id: MarkerId) -> AppResult<Marker> {
    let marker = existing(store, id).await?;
    if !marker.is_active {
        return Err(AppError::Core(CoreError::Conflict(
            "This marker is inactive.".into(),
        )));
    }
    Ok(marker)
}

/// Overwrite a marker's editable fields. Last write wins.
pub async fn update_marker(
    store: &dyn RowStore,
    id: MarkerId,
    input: UpdateMarker,
) -> AppResult<Marker> {
    let current = editable(store, id).await?;
    let mut dto = input.normalized();
    dto.validate()?;

    let category = CategoryRepo::find_by_id(store, &dto.category_id)
        .await?
        .filter(|c| c.is_active);
    if current.is_place() {
        dto.brand_id = None;
        if !category.is_some_and(|c| c.for_places) {
            return Err(invalid("Pick a place category."));
        }
    } else {
        validate_product_brand(dto.brand_id.as_deref()).map_err(CoreError::Validation)?;
        dto.lat = None;
        dto.lon = None;
        dto.address = None;
        if !category.is_some_and(|c| c.for_products) {
            return Err(invalid("Pick a product category."));
        }
        let brand_id = dto.brand_id.as_deref().unwrap_or_default();
        match BrandRepo::find_by_id(store, brand_id).await? {
            Some(b) if b.is_active => {}
            _ => return Err(invalid("Brand is required.")),
        }
    }

    let updated = MarkerRepo::update(store, id, &dto)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Marker", id)))?;
    tracing::info!(marker_id = %id, "Marker updated");
    Ok(updated)
}

/// Soft-delete a marker.
pub async fn deactivate_marker(store: &dyn RowStore, id: MarkerId) -> AppResult<()> {
    editable(store, id).await?;
    if !MarkerRepo::deactivate(store, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "This marker is inactive.".into(),
        )));
    }
    tracing::info!(marker_id = %id, "Marker deactivated");
    Ok(())
}

async fn existing(store: &dyn RowStore, id: MarkerId) -> AppResult<Marker> {
    MarkerRepo::find_by_id(store, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("Marker", id)))
}

/// Save the user's vote on a marker.
pub async fn save_vote(
    store: &dyn RowStore,
    marker_id: MarkerId,
    user_id: UserId,
    value: VoteValue,
) -> AppResult<Vote> {
    editable(store, marker_id).await?;
    let vote = VoteRepo::save(store, marker_id, user_id, value).await?;
    tracing::info!(marker_id = %marker_id, user_id = %user_id, vote = value.get(), "Vote saved");
    Ok(vote)
}

/// Clear the user's vote, keeping its value.
pub async fn clear_vote(
    store: &dyn RowStore,
    marker_id: MarkerId,
    user_id: UserId,
) -> AppResult<VoteState> {
    editable(store, marker_id).await?;
    let state = VoteRepo::clear(store, marker_id, user_id).await?;
    tracing::info!(marker_id = %marker_id, user_id = %user_id, "Vote cleared");
    Ok(state)
}

/// Bring back a cleared vote with its retained value.
pub async fn reactivate_vote(
    store: &dyn RowStore,
    marker_id: MarkerId,
    user_id: UserId,
) -> AppResult<Vote> {
    editable(store, marker_id).await?;
    let vote = VoteRepo::reactivate(store, marker_id, user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "There is no earlier vote to bring back.".into(),
            ))
        })?;
    tracing::info!(marker_id = %marker_id, user_id = %user_id, "Vote reactivated");
    Ok(vote)
}

/// Parse a 1–10 vote typed into a form.
pub fn parse_vote(raw: &str) -> AppResult<VoteValue> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|n| VoteValue::new(n).ok())
        .ok_or_else(|| invalid("Vote must be 1–10."))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_vote_bounds() {
        assert_eq!(parse_vote(" 10 ").unwrap().get(), 10);
        assert_matches!(
            parse_vote("0"),
            Err(AppError::Core(CoreError::Validation(m))) if m == "Vote must be 1–10."
        );
        assert!(parse_vote("eleven").is_err());
    }

    #[test]
    fn new_place_vote_defaults() {
        let input: NewPlace = serde_json::from_value(serde_json::json!({
            "title": "Da Michele",
            "category_id": "1",
            "lat": 40.85,
            "lon": 14.26
        }))
        .unwrap();
        assert_eq!(input.vote.get(), 7);
        assert_eq!(input.address, None);
    }

    #[test]
    fn new_product_rejects_out_of_range_vote() {
        let result: Result<NewProduct, _> = serde_json::from_value(serde_json::json!({
            "title": "Excellence 70%",
            "category_id": "3",
            "brand_id": "10",
            "vote": 11
        }));
        assert!(result.is_err());
    }
}
