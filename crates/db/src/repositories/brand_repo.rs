//! Repository for the `brands` table.

use crate::models::brand::Brand;
use crate::models::{decode_first, decode_rows};
use crate::store::{Direction, Query, RowStore, StoreError};

const TABLE: &str = "brands";

const COLUMNS: &str = "id,name,is_active";

/// Read access to brands.
pub struct BrandRepo;

impl BrandRepo {
    /// Active brands ordered by id.
    pub async fn list_active(store: &dyn RowStore) -> Result<Vec<Brand>, StoreError> {
        let query = Query::new()
            .select(COLUMNS)
            .eq("is_active", true)
            .order("id", Direction::Asc);
        decode_rows(store.select(TABLE, &query).await?)
    }

    pub async fn find_by_id(store: &dyn RowStore, id: &str) -> Result<Option<Brand>, StoreError> {
        let query = Query::new().select(COLUMNS).eq("id", id).limit(1);
        decode_first(store.select(TABLE, &query).await?)
    }
}
