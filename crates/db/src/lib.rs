//! Row-store access for the ratings catalog.
//!
//! The catalog lives in a hosted, PostgREST-compatible row store. This crate
//! provides the [`RowStore`] abstraction with an HTTP implementation and an
//! in-memory one, the row models, and one repository per table.

use std::sync::Arc;

pub mod lookup;
pub mod models;
pub mod repositories;
pub mod store;

pub use store::memory::MemoryStore;
pub use store::rest::RestStore;
pub use store::{Direction, Query, RowStore, StoreError};

/// Shared handle to whichever store backs the application.
pub type DynStore = Arc<dyn RowStore>;

/// Check that the store answers at all.
pub async fn health_check(store: &dyn RowStore) -> Result<(), StoreError> {
    store.ping().await
}
