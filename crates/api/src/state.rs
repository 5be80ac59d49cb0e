use std::sync::Arc;

use tba_db::DynStore;

use crate::config::ServerConfig;
use crate::geocode::Geocoder;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Row store acting with the public key. Signed-in requests use
    /// [`crate::middleware::auth::AuthUser::store`] instead.
    pub store: DynStore,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Reverse geocoding client for the map's add-place form.
    pub geocoder: Arc<Geocoder>,
}
