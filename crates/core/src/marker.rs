//! Marker kinds, client-side validation, and display labels.
//!
//! The row store does not enforce any of these rules; the server checks them
//! before writing so malformed rows never originate here.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Vote preselected in 1–10 dropdowns.
pub const DEFAULT_VOTE: u8 = 7;

/// Discriminates physical places (with coordinates) from products (with a brand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupType {
    Place,
    Product,
}

impl GroupType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::Product => "product",
        }
    }

    /// Parse the wire value. Anything else, including empty, is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "place" => Some(Self::Place),
            "product" => Some(Self::Product),
            _ => None,
        }
    }
}

impl fmt::Display for GroupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Titles must contain something other than whitespace.
pub fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        Err("Title required.".to_string())
    } else {
        Ok(())
    }
}

/// Coordinates come as a pair or not at all, and must be on the globe.
pub fn validate_coordinates(lat: Option<f64>, lon: Option<f64>) -> Result<(), String> {
    match (lat, lon) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("Latitude {lat} is out of range"));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("Longitude {lon} is out of range"));
            }
            Ok(())
        }
        _ => Err("Latitude and longitude must be given together".to_string()),
    }
}

/// Products are identified by (category, brand), so the brand is mandatory.
pub fn validate_product_brand(brand_id: Option<&str>) -> Result<(), String> {
    match brand_id {
        Some(b) if !b.trim().is_empty() => Ok(()),
        _ => Err("Brand is required.".to_string()),
    }
}

/// Product label: `"Category · Brand"`, trimmed when the brand is unknown.
pub fn product_label(category_name: &str, brand_name: &str) -> String {
    format!("{category_name} · {brand_name}").trim().to_string()
}

/// Place label: the title, or the category name when the title is blank.
pub fn place_label(title: &str, category_name: &str) -> String {
    if title.trim().is_empty() {
        category_name.to_string()
    } else {
        title.to_string()
    }
}

/// `YYYY-MM-DD HH:MM:SS` from an ISO-8601 timestamp string.
pub fn format_timestamp(iso: &str) -> String {
    iso.replacen('T', " ", 1).chars().take(19).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_type_wire_values() {
        assert_eq!(GroupType::parse("place"), Some(GroupType::Place));
        assert_eq!(GroupType::parse(" product "), Some(GroupType::Product));
        assert_eq!(GroupType::parse(""), None);
        assert_eq!(GroupType::parse("Place"), None);
        assert_eq!(
            serde_json::to_string(&GroupType::Product).unwrap(),
            "\"product\""
        );
    }

    #[test]
    fn blank_title_rejected() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Bar Pinotxo").is_ok());
    }

    #[test]
    fn coordinates_both_or_neither() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(41.38), Some(2.16)).is_ok());
        assert!(validate_coordinates(Some(41.38), None).is_err());
        assert!(validate_coordinates(None, Some(2.16)).is_err());
    }

    #[test]
    fn coordinates_range_checked() {
        assert!(validate_coordinates(Some(91.0), Some(0.0)).is_err());
        assert!(validate_coordinates(Some(0.0), Some(-181.0)).is_err());
    }

    #[test]
    fn product_needs_brand() {
        assert!(validate_product_brand(None).is_err());
        assert!(validate_product_brand(Some(" ")).is_err());
        assert!(validate_product_brand(Some("7")).is_ok());
    }

    #[test]
    fn labels() {
        assert_eq!(product_label("Croissant", "Brioche Pasquier"), "Croissant · Brioche Pasquier");
        assert_eq!(product_label("Croissant", ""), "Croissant ·");
        assert_eq!(place_label("", "Pizza"), "Pizza");
        assert_eq!(place_label("Da Michele", "Pizza"), "Da Michele");
    }

    #[test]
    fn timestamp_formatting() {
        assert_eq!(
            format_timestamp("2025-03-14T09:26:53.589+00:00"),
            "2025-03-14 09:26:53"
        );
        assert_eq!(format_timestamp(""), "");
    }
}
