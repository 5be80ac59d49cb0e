//! Repository for the `markers` table.

use std::collections::HashMap;

use serde_json::{json, Value};
use tba_core::listing::{ListFilter, MapFilter};
use tba_core::marker::GroupType;
use tba_core::rating::RatingBucket;
use tba_core::types::{CategoryId, MarkerId};
use tba_core::vote::VoteValue;

use crate::models::marker::{CreatePlace, CreateProduct, Marker, UpdateMarker};
use crate::models::vote::CategoryRef;
use crate::models::{decode_first, decode_rows};
use crate::store::{Query, RowStore, StoreError};

const TABLE: &str = "markers";

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id,title,group_type,category_id,brand_id,rating_manual,rating_avg,\
                       rating_count,address,lat,lon,is_active,created_at";

/// Predicates for listing active markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerQuery {
    pub group_type: Option<GroupType>,
    pub category_id: Option<CategoryId>,
    /// `rating_avg >= min_rating`.
    pub min_rating: Option<VoteValue>,
    /// Only markers the classifier puts in this bucket.
    pub bucket: Option<RatingBucket>,
}

impl MarkerQuery {
    pub fn places() -> Self {
        Self {
            group_type: Some(GroupType::Place),
            ..Self::default()
        }
    }

    pub fn products() -> Self {
        Self {
            group_type: Some(GroupType::Product),
            ..Self::default()
        }
    }

    fn to_query(&self) -> Query {
        let mut query = Query::new().select(COLUMNS).eq("is_active", true);
        if let Some(t) = self.group_type {
            query = query.eq("group_type", t.as_str());
        }
        if let Some(c) = &self.category_id {
            query = query.eq("category_id", c.as_str());
        }
        if let Some(min) = self.min_rating {
            query = query.gte("rating_avg", i64::from(min));
        }
        if let Some(bounds) = self.bucket.and_then(RatingBucket::bounds) {
            query = query.gt("rating_count", 0);
            if let Some(min) = bounds.min {
                query = query.gte("rating_avg", min);
            }
            if let Some(below) = bounds.below {
                query = query.lt("rating_avg", below);
            }
        }
        query
    }
}

impl From<&ListFilter> for MarkerQuery {
    fn from(filter: &ListFilter) -> Self {
        Self {
            group_type: filter.group_type,
            category_id: filter.category_id.clone(),
            min_rating: filter.min_rating,
            bucket: None,
        }
    }
}

impl From<&MapFilter> for MarkerQuery {
    /// The map only shows places.
    fn from(filter: &MapFilter) -> Self {
        Self {
            group_type: Some(GroupType::Place),
            category_id: filter.category_id.clone(),
            min_rating: None,
            bucket: filter.rating_bucket,
        }
    }
}

/// Result of creating a product.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductOutcome {
    Created(Marker),
    /// A product with the same (category, brand) already exists.
    Existing(MarkerId),
}

/// Provides marker reads and writes.
pub struct MarkerRepo;

impl MarkerRepo {
    /// Active markers matching `filter`, in store order.
    pub async fn list(store: &dyn RowStore, filter: &MarkerQuery) -> Result<Vec<Marker>, StoreError> {
        decode_rows(store.select(TABLE, &filter.to_query()).await?)
    }

    /// Find a marker by id. Inactive markers are returned too.
    pub async fn find_by_id(store: &dyn RowStore, id: MarkerId) -> Result<Option<Marker>, StoreError> {
        let query = Query::new()
            .select(COLUMNS)
            .eq("id", id.to_string())
            .limit(1);
        decode_first(store.select(TABLE, &query).await?)
    }

    /// Markers with the given ids, active or not.
    pub async fn find_many(store: &dyn RowStore, ids: &[MarkerId]) -> Result<Vec<Marker>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .select(COLUMNS)
            .in_list("id", ids.iter().map(ToString::to_string));
        decode_rows(store.select(TABLE, &query).await?)
    }

    /// The product with this (category, brand) identity, active or not.
    pub async fn find_product(
        store: &dyn RowStore,
        category_id: &str,
        brand_id: &str,
    ) -> Result<Option<Marker>, StoreError> {
        let query = Query::new()
            .select(COLUMNS)
            .eq("group_type", GroupType::Product.as_str())
            .eq("category_id", category_id)
            .eq("brand_id", brand_id)
            .limit(1);
        decode_first(store.select(TABLE, &query).await?)
    }

    /// Insert a place, returning the created row.
    pub async fn create_place(store: &dyn RowStore, input: &CreatePlace) -> Result<Marker, StoreError> {
        let row = json!({
            "title": input.title,
            "group_type": GroupType::Place,
            "category_id": input.category_id,
            "brand_id": Value::Null,
            "rating_manual": input.rating_manual,
            "address": input.address,
            "lat": input.lat,
            "lon": input.lon,
            "is_active": true,
        });
        let created = store.insert(TABLE, row).await?;
        Ok(serde_json::from_value(created)?)
    }

    /// Insert a product unless one with the same (category, brand) exists.
    ///
    /// The lookup before inserting only saves a round trip in the common
    /// case. The store's unique key on (category_id, brand_id) decides: when
    /// the insert collides, the winning row is read back and reported as
    /// [`ProductOutcome::Existing`], exactly as if the lookup had found it.
    pub async fn create_product(
        store: &dyn RowStore,
        input: &CreateProduct,
    ) -> Result<ProductOutcome, StoreError> {
        if let Some(existing) = Self::find_product(store, &input.category_id, &input.brand_id).await? {
            tracing::debug!(marker_id = %existing.id, "Product already exists");
            return Ok(ProductOutcome::Existing(existing.id));
        }

        let row = json!({
            "title": input.title,
            "group_type": GroupType::Product,
            "category_id": input.category_id,
            "brand_id": input.brand_id,
            "rating_manual": input.rating_manual,
            "address": Value::Null,
            "lat": Value::Null,
            "lon": Value::Null,
            "is_active": true,
        });

        match store.insert(TABLE, row).await {
            Ok(created) => Ok(ProductOutcome::Created(serde_json::from_value(created)?)),
            Err(e) if e.is_unique_violation() => {
                let existing = Self::find_product(store, &input.category_id, &input.brand_id)
                    .await?
                    .ok_or(e)?;
                tracing::debug!(marker_id = %existing.id, "Product created concurrently");
                Ok(ProductOutcome::Existing(existing.id))
            }
            Err(e) => Err(e),
        }
    }

    /// Overwrite the editable fields. Last write wins.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        store: &dyn RowStore,
        id: MarkerId,
        input: &UpdateMarker,
    ) -> Result<Option<Marker>, StoreError> {
        let patch = json!({
            "title": input.title,
            "category_id": input.category_id,
            "brand_id": input.brand_id,
            "address": input.address,
            "lat": input.lat,
            "lon": input.lon,
        });
        let query = Query::new().eq("id", id.to_string());
        decode_first(store.update(TABLE, &query, patch).await?)
    }

    /// Soft-delete a marker. Returns `true` if an active row was deactivated.
    pub async fn deactivate(store: &dyn RowStore, id: MarkerId) -> Result<bool, StoreError> {
        let query = Query::new()
            .eq("id", id.to_string())
            .eq("is_active", true);
        let rows = store
            .update(TABLE, &query, json!({ "is_active": false }))
            .await?;
        Ok(!rows.is_empty())
    }

    /// Number of active places per category.
    pub async fn place_category_usage(
        store: &dyn RowStore,
    ) -> Result<HashMap<CategoryId, usize>, StoreError> {
        let query = Query::new()
            .select("category_id")
            .eq("is_active", true)
            .eq("group_type", GroupType::Place.as_str());
        let refs: Vec<CategoryRef> = decode_rows(store.select(TABLE, &query).await?)?;

        let mut usage = HashMap::new();
        for category_id in refs.into_iter().filter_map(|r| r.category_id) {
            *usage.entry(category_id).or_insert(0) += 1;
        }
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_filter_renders_predicates() {
        let query = MarkerQuery {
            group_type: Some(GroupType::Product),
            category_id: Some("croissant".into()),
            min_rating: VoteValue::new(7).ok(),
            bucket: None,
        }
        .to_query();
        let pairs = query.to_pairs();
        assert!(pairs.contains(&("is_active".into(), "eq.true".into())));
        assert!(pairs.contains(&("group_type".into(), "eq.product".into())));
        assert!(pairs.contains(&("category_id".into(), "eq.croissant".into())));
        assert!(pairs.contains(&("rating_avg".into(), "gte.7".into())));
    }

    #[test]
    fn bucket_renders_half_open_range_with_votes() {
        let query = MarkerQuery {
            bucket: Some(RatingBucket::SevenEight),
            ..MarkerQuery::places()
        }
        .to_query();
        let pairs = query.to_pairs();
        assert!(pairs.contains(&("rating_count".into(), "gt.0".into())));
        assert!(pairs.contains(&("rating_avg".into(), "gte.7.0".into())));
        assert!(pairs.contains(&("rating_avg".into(), "lt.9.0".into())));
    }

    #[test]
    fn map_filter_always_targets_places() {
        let filter = MapFilter {
            category_id: Some("pizza".into()),
            rating_bucket: Some(RatingBucket::NineTen),
            focus: None,
        };
        let query = MarkerQuery::from(&filter);
        assert_eq!(query.group_type, Some(GroupType::Place));
        assert_eq!(query.bucket, Some(RatingBucket::NineTen));
    }
}
