//! Handlers for markers: listing, detail, creation, edit, and soft delete.
//!
//! Reads are public; writes require [`AuthUser`] and go to the row store as
//! that user.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tba_core::error::CoreError;
use tba_core::listing::{sort_by_rating_then_title, CategoryScope, ListFilter, ListParams};
use tba_core::rating::RatingBucket;
use tba_core::types::MarkerId;
use tba_db::lookup::LookupTables;
use tba_db::models::marker::UpdateMarker;
use tba_db::repositories::{MarkerQuery, MarkerRepo};

use crate::catalog::{self, NewPlace, NewProduct, ProductCreated};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::MarkerListParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::MarkerSummary;

/// `{ "id", "existing": true }` for a product that was already there.
#[derive(Debug, Serialize)]
pub struct ExistingProduct {
    pub id: MarkerId,
    pub existing: bool,
}

/// GET /api/v1/markers?type=&category=&min_rating=&rating=
///
/// Active markers, best rated first then by title. Unknown filter values
/// are ignored.
pub async fn list_markers(
    State(state): State<AppState>,
    Query(params): Query<MarkerListParams>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    let lookups = LookupTables::load(store, CategoryScope::All).await?;

    let list_params = ListParams {
        group_type: params.group_type,
        category: params.category,
        min_rating: params.min_rating,
    };
    let filter = ListFilter::from_params(&list_params, |id| lookups.has_category(id));
    let query = MarkerQuery {
        bucket: params.rating.as_deref().and_then(RatingBucket::parse_key),
        ..MarkerQuery::from(&filter)
    };

    let mut markers = MarkerRepo::list(store, &query).await?;
    sort_by_rating_then_title(&mut markers);

    Ok(Json(DataResponse {
        data: MarkerSummary::many(markers, &lookups, &state.config),
    }))
}

/// GET /api/v1/markers/{id}
///
/// Inactive markers are returned too, flagged by `is_active`.
pub async fn get_marker(
    State(state): State<AppState>,
    Path(id): Path<MarkerId>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    let marker = MarkerRepo::find_by_id(store, id)
        .await?
        .ok_or(AppError::Core(CoreError::not_found("Marker", id)))?;
    let lookups = LookupTables::load(store, CategoryScope::All).await?;

    Ok(Json(DataResponse {
        data: MarkerSummary::new(marker, &lookups, &state.config),
    }))
}

/// PUT /api/v1/markers/{id}
///
/// Overwrite the editable fields. Rejected for inactive markers.
pub async fn update_marker(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<MarkerId>,
    Json(input): Json<UpdateMarker>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let marker = catalog::update_marker(store.as_ref(), id, input).await?;

    tracing::info!(marker_id = %id, user_id = %auth.user_id, "Marker edited");

    Ok(Json(DataResponse { data: marker }))
}

/// POST /api/v1/markers/{id}/deactivate
pub async fn deactivate_marker(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<MarkerId>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    catalog::deactivate_marker(store.as_ref(), id).await?;

    tracing::info!(marker_id = %id, user_id = %auth.user_id, "Marker deactivated by user");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/places
///
/// Create a place and the creator's vote. A failed vote does not undo the
/// place; it is reported in `vote_error`.
pub async fn create_place(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewPlace>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let created = catalog::create_place(store.as_ref(), auth.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/products
///
/// Create a product and the creator's vote, or point at the product that
/// already has this category and brand (200 with `existing: true`).
pub async fn create_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewProduct>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let response = match catalog::create_product(store.as_ref(), auth.user_id, input).await? {
        ProductCreated::New(created) => {
            (StatusCode::CREATED, Json(DataResponse { data: created })).into_response()
        }
        ProductCreated::Existing(id) => Json(DataResponse {
            data: ExistingProduct { id, existing: true },
        })
        .into_response(),
    };

    Ok(response)
}
