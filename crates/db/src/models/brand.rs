//! Brand rows.

use serde::{Deserialize, Serialize};
use tba_core::types::BrandId;

use super::ids::{null_as_default, text_id};

/// A row from the `brands` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(deserialize_with = "text_id")]
    pub id: BrandId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
