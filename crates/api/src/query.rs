//! Shared query parameter types for API and page handlers.

use serde::Deserialize;
use tba_core::listing::CategoryScope;

/// `?scope=all|places|products` for category listings.
#[derive(Debug, Default, Deserialize)]
pub struct ScopeParams {
    #[serde(default)]
    pub scope: CategoryScope,
}

/// `?last=<marker id>`: the spotlight pick the client is currently showing.
///
/// Unparsable ids are ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct SpotlightParams {
    pub last: Option<String>,
}

impl SpotlightParams {
    pub fn last_shown(&self) -> Option<tba_core::types::MarkerId> {
        self.last
            .as_deref()
            .and_then(|s| uuid::Uuid::parse_str(s.trim()).ok())
    }
}

/// `?lat=&lon=` for reverse geocoding.
#[derive(Debug, Deserialize)]
pub struct PointParams {
    pub lat: f64,
    pub lon: f64,
}

/// `GET /markers` filters: the list page's filters plus the map's rating bucket.
#[derive(Debug, Default, Deserialize)]
pub struct MarkerListParams {
    #[serde(rename = "type")]
    pub group_type: Option<String>,
    pub category: Option<String>,
    pub min_rating: Option<String>,
    pub rating: Option<String>,
}
