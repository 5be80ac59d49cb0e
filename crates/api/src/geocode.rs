//! Reverse geocoding through a Nominatim-compatible endpoint.
//!
//! Used to prefill the address of a place being added on the map. Lookups
//! are best effort: callers show a hint and let the user type the address.

use std::time::Duration;

use serde::Deserialize;

/// Default public Nominatim reverse endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/reverse";

/// Zoom level asking for building-level detail.
const ZOOM: &str = "18";

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Geocoder answered with status {0}")]
    Status(u16),

    #[error("Geocoder returned no address")]
    NoAddress,
}

/// Reverse geocoding client settings.
#[derive(Debug, Clone)]
pub struct GeocodeConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl GeocodeConfig {
    /// | Env Var               | Default                     |
    /// |-----------------------|-----------------------------|
    /// | `GEOCODE_BASE_URL`    | public Nominatim `/reverse` |
    /// | `GEOCODE_USER_AGENT`  | `thebestagain/<version>`    |
    /// | `GEOCODE_TIMEOUT_SECS`| `10`                        |
    ///
    /// # Panics
    ///
    /// Panics if `GEOCODE_TIMEOUT_SECS` is not a valid u64.
    pub fn from_vars<F>(var: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            base_url: var("GEOCODE_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            user_agent: var("GEOCODE_USER_AGENT")
                .unwrap_or_else(|| format!("thebestagain/{}", env!("CARGO_PKG_VERSION"))),
            timeout_secs: var("GEOCODE_TIMEOUT_SECS")
                .unwrap_or_else(|| "10".into())
                .parse()
                .expect("GEOCODE_TIMEOUT_SECS must be a valid u64"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
}

/// Reverse geocoder.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: reqwest::Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(config: &GeocodeConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Query parameters for one reverse lookup.
    fn reverse_params(lat: f64, lon: f64) -> [(&'static str, String); 5] {
        [
            ("format", "jsonv2".to_string()),
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("zoom", ZOOM.to_string()),
            ("addressdetails", "1".to_string()),
        ]
    }

    /// The human-readable address at a point.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<String, GeocodeError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::reverse_params(lat, lon))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status.as_u16()));
        }

        let body: ReverseResponse = response.json().await?;
        body.display_name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(GeocodeError::NoAddress)
    }
}
