use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use tba_core::listing::CategoryScope;
use tba_db::lookup::LookupTables;
use tba_db::repositories::{MarkerQuery, MarkerRepo};

use crate::error::AppResult;
use crate::query::SpotlightParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::SpotlightPick;

/// GET /api/v1/spotlight?last=<id>
///
/// A random active marker, preferring ones with votes. Pass the id currently
/// shown as `last` to make an immediate repeat less likely. `data` is null
/// when there are no markers.
pub async fn pick_spotlight(
    State(state): State<AppState>,
    Query(params): Query<SpotlightParams>,
) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    let lookups = LookupTables::load(store, CategoryScope::All).await?;
    let markers = MarkerRepo::list(store, &MarkerQuery::default()).await?;

    let pick = SpotlightPick::choose(
        &markers,
        params.last_shown(),
        &lookups,
        &state.config,
        &mut rand::rng(),
    );

    Ok(Json(DataResponse { data: pick }))
}
