//! Repository for the `categories` table.

use tba_core::listing::CategoryScope;

use crate::models::category::Category;
use crate::models::{decode_first, decode_rows};
use crate::store::{Direction, Query, RowStore, StoreError};

const TABLE: &str = "categories";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id,name,icon_url,is_active,for_places,for_products";

/// Read access to categories. Categories are managed outside this service.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Active categories offered in `scope`, ordered by id.
    pub async fn list_active(
        store: &dyn RowStore,
        scope: CategoryScope,
    ) -> Result<Vec<Category>, StoreError> {
        let query = Query::new().select(COLUMNS).eq("is_active", true);
        let query = match scope {
            CategoryScope::All => query,
            CategoryScope::Places => query.eq("for_places", true),
            CategoryScope::Products => query.eq("for_products", true),
        };
        let rows = store
            .select(TABLE, &query.order("id", Direction::Asc))
            .await?;
        decode_rows(rows)
    }

    /// Find a category by id, active or not.
    pub async fn find_by_id(
        store: &dyn RowStore,
        id: &str,
    ) -> Result<Option<Category>, StoreError> {
        let query = Query::new().select(COLUMNS).eq("id", id).limit(1);
        decode_first(store.select(TABLE, &query).await?)
    }

    /// Categories with the given ids, active or not.
    pub async fn find_many(
        store: &dyn RowStore,
        ids: &[String],
    ) -> Result<Vec<Category>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select(COLUMNS)
            .in_list("id", ids.iter().map(String::as_str));
        decode_rows(store.select(TABLE, &query).await?)
    }
}
