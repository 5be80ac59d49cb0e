//! Row models and write DTOs.
//!
//! Each submodule contains:
//! - A `Deserialize` + `Serialize` struct matching the stored row
//! - `Deserialize` + `Validate` DTOs for writes, where the table takes writes

pub mod brand;
pub mod category;
pub mod ids;
pub mod marker;
pub mod vote;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::store::StoreError;

/// Decode a batch of JSON rows.
pub(crate) fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|r| serde_json::from_value(r).map_err(StoreError::from))
        .collect()
}

/// Decode the first row, if any.
pub(crate) fn decode_first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>, StoreError> {
    rows.into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()
        .map_err(StoreError::from)
}
