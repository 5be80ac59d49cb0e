//! Display-ready shapes built from rows and a [`LookupTables`] snapshot.
//!
//! The JSON API returns these and the page renderers read them, so both
//! surfaces label, colour, and summarise markers the same way.

use rand::Rng;
use serde::Serialize;
use tba_core::marker::GroupType;
use tba_core::rating::{format_overall, format_overall_compact, RatingBucket};
use tba_core::spotlight::{pick_quip, Spotlight};
use tba_core::types::MarkerId;
use tba_db::lookup::LookupTables;
use tba_db::models::marker::Marker;

use crate::config::ServerConfig;

/// A marker with its names, icon, and rating band resolved.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerSummary {
    #[serde(flatten)]
    pub marker: Marker,
    /// "Category · Brand" for products, title (or category) for places.
    pub label: String,
    pub category_name: String,
    pub brand_name: String,
    pub icon_url: String,
    pub bucket: RatingBucket,
    /// `"8.50/10 (2 votes)"`.
    pub overall: String,
}

impl MarkerSummary {
    pub fn new(marker: Marker, lookups: &LookupTables, config: &ServerConfig) -> Self {
        let category_id = marker.category_id.as_deref();
        Self {
            label: lookups.marker_label(&marker),
            category_name: lookups.category_name(category_id),
            brand_name: lookups.brand_name(marker.brand_id.as_deref()),
            icon_url: lookups.icon_for(
                category_id,
                &config.public_base_url,
                &config.default_icon_url,
            ),
            bucket: marker.bucket(),
            overall: format_overall_compact(marker.rating_avg, marker.rating_count),
            marker,
        }
    }

    pub fn many(markers: Vec<Marker>, lookups: &LookupTables, config: &ServerConfig) -> Vec<Self> {
        markers
            .into_iter()
            .map(|m| Self::new(m, lookups, config))
            .collect()
    }

    pub fn id(&self) -> MarkerId {
        self.marker.id
    }

    pub fn css_class(&self) -> &'static str {
        self.bucket.css_class()
    }

    /// `"8.50 / 10 · 2 votes"`, the home page wording.
    pub fn overall_long(&self) -> String {
        format_overall(self.marker.rating_avg, self.marker.rating_count)
    }

    /// Address for places, brand for products.
    pub fn info(&self) -> String {
        match self.marker.group_type {
            GroupType::Place => self.marker.address.clone().unwrap_or_default(),
            GroupType::Product if self.brand_name.is_empty() => String::new(),
            GroupType::Product => format!("Brand: {}", self.brand_name),
        }
    }
}

/// The home page's random highlight.
#[derive(Debug, Clone, Serialize)]
pub struct SpotlightPick {
    pub marker: MarkerSummary,
    pub quip: &'static str,
    /// "Random place from your world." or the product equivalent.
    pub kicker: &'static str,
    /// Address line for places, brand line for products.
    pub detail: String,
    pub secondary_href: String,
    pub secondary_label: &'static str,
}

impl SpotlightPick {
    /// Pick among `markers`, avoiding an immediate repeat of `last_shown`.
    pub fn choose<R: Rng + ?Sized>(
        markers: &[Marker],
        last_shown: Option<MarkerId>,
        lookups: &LookupTables,
        config: &ServerConfig,
        rng: &mut R,
    ) -> Option<Self> {
        let mut spotlight = Spotlight::resume(last_shown);
        let chosen = spotlight.pick(markers, rng)?.clone();
        let quip = pick_quip(rng);

        let (kicker, detail, secondary_href, secondary_label) = if chosen.is_place() {
            let detail = match chosen.address.as_deref().map(str::trim) {
                Some(addr) if !addr.is_empty() => format!("📍 {addr}"),
                _ => "📍 No address yet".to_string(),
            };
            (
                "Random place from your world.",
                detail,
                format!("/map?focus={}", chosen.id),
                "Open on Map",
            )
        } else {
            let brand = lookups.brand_name(chosen.brand_id.as_deref());
            let brand = if brand.is_empty() {
                "Unknown brand".to_string()
            } else {
                brand
            };
            (
                "Random product from your stash.",
                format!("🏷️ {brand}"),
                "/products".to_string(),
                "Open Products",
            )
        };

        Some(Self {
            marker: MarkerSummary::new(chosen, lookups, config),
            quip,
            kicker,
            detail,
            secondary_href,
            secondary_label,
        })
    }
}
