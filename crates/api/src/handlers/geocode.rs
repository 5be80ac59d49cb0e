use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tba_core::marker::validate_coordinates;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::PointParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Shown when the lookup fails; the address field stays editable.
pub const LOOKUP_FAILED: &str = "Address lookup failed (you can type it manually).";

#[derive(Debug, Serialize)]
pub struct ReverseGeocode {
    /// Empty when the lookup failed.
    pub address: String,
    pub message: &'static str,
}

/// GET /api/v1/geocode/reverse?lat=&lon=
///
/// Signed-in only, since the upstream service is rate limited and only the
/// add-place form calls it. A failed lookup is still a 200 with an empty
/// address.
pub async fn reverse_geocode(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(point): Query<PointParams>,
) -> AppResult<impl IntoResponse> {
    validate_coordinates(Some(point.lat), Some(point.lon)).map_err(AppError::BadRequest)?;

    let data = match state.geocoder.reverse(point.lat, point.lon).await {
        Ok(address) => ReverseGeocode {
            address,
            message: "Address filled ✅ Now click Save.",
        },
        Err(e) => {
            tracing::warn!(user_id = %auth.user_id, lat = point.lat, lon = point.lon, error = %e, "Reverse geocoding failed");
            ReverseGeocode {
                address: String::new(),
                message: LOOKUP_FAILED,
            }
        }
    };

    Ok(Json(DataResponse { data }))
}
