use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use tba_db::repositories::CategoryRepo;

use crate::error::AppResult;
use crate::query::ScopeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/categories?scope=all|places|products
///
/// Active categories offered for the scope, ordered by id.
pub async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> AppResult<impl IntoResponse> {
    let categories = CategoryRepo::list_active(state.store.as_ref(), params.scope).await?;

    Ok(Json(DataResponse { data: categories }))
}
