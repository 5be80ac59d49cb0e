//! Handlers for the signed-in user's votes.
//!
//! One vote per (marker, user). Clearing keeps the value so it can be
//! reactivated. All endpoints require authentication via [`AuthUser`].

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use tba_core::types::MarkerId;
use tba_db::models::vote::SaveVote;
use tba_db::repositories::VoteRepo;

use crate::catalog;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/markers/{id}/vote
///
/// `{"state":"no_row"}`, `{"state":"active","value":7}`, or
/// `{"state":"inactive","retained":7}`.
pub async fn get_my_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(marker_id): Path<MarkerId>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let vote_state = VoteRepo::find_mine(store.as_ref(), marker_id, auth.user_id).await?;

    Ok(Json(DataResponse { data: vote_state }))
}

/// PUT /api/v1/markers/{id}/vote
pub async fn save_my_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(marker_id): Path<MarkerId>,
    Json(input): Json<SaveVote>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let vote = catalog::save_vote(store.as_ref(), marker_id, auth.user_id, input.vote).await?;

    Ok(Json(DataResponse { data: vote }))
}

/// DELETE /api/v1/markers/{id}/vote
///
/// Deactivates the vote. Returns the resulting state.
pub async fn clear_my_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(marker_id): Path<MarkerId>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let vote_state = catalog::clear_vote(store.as_ref(), marker_id, auth.user_id).await?;

    Ok(Json(DataResponse { data: vote_state }))
}

/// POST /api/v1/markers/{id}/vote/reactivate
pub async fn reactivate_my_vote(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(marker_id): Path<MarkerId>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let vote = catalog::reactivate_vote(store.as_ref(), marker_id, auth.user_id).await?;

    Ok(Json(DataResponse { data: vote }))
}

/// GET /api/v1/votes/mine
///
/// Active votes, highest first then most recently updated.
pub async fn list_my_votes(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let store = auth.store(&state);
    let votes = VoteRepo::list_mine(store.as_ref(), auth.user_id).await?;

    Ok(Json(DataResponse { data: votes }))
}
