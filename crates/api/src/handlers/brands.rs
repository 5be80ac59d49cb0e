use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tba_db::repositories::BrandRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/brands
pub async fn list_brands(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let brands = BrandRepo::list_active(state.store.as_ref()).await?;

    Ok(Json(DataResponse { data: brands }))
}
