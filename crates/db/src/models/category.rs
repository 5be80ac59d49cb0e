//! Category rows.

use serde::{Deserialize, Serialize};
use tba_core::types::CategoryId;

use super::ids::{null_as_default, text_id};

/// A row from the `categories` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(deserialize_with = "text_id")]
    pub id: CategoryId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub for_places: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub for_products: bool,
}

fn default_true() -> bool {
    true
}
