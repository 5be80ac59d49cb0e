//! Per-request snapshot of categories and brands.
//!
//! Built once per page load or API call and passed by reference into
//! whatever needs display names or icons. Never mutated after construction.

use std::collections::HashMap;

use tba_core::icon::icon_or_default;
use tba_core::listing::CategoryScope;
use tba_core::marker::{place_label, product_label, GroupType};
use tba_core::types::CategoryId;
use url::Url;

use crate::models::brand::Brand;
use crate::models::category::Category;
use crate::models::marker::Marker;
use crate::repositories::{BrandRepo, CategoryRepo};
use crate::store::{RowStore, StoreError};

/// Immutable id-keyed view over categories and brands.
#[derive(Debug, Clone, Default)]
pub struct LookupTables {
    categories: Vec<Category>,
    category_index: HashMap<String, usize>,
    brands: Vec<Brand>,
    brand_index: HashMap<String, usize>,
}

impl LookupTables {
    pub fn new(categories: Vec<Category>, brands: Vec<Brand>) -> Self {
        let category_index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        let brand_index = brands
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.clone(), i))
            .collect();
        Self {
            categories,
            category_index,
            brands,
            brand_index,
        }
    }

    /// Load active categories in `scope` and all active brands.
    pub async fn load(store: &dyn RowStore, scope: CategoryScope) -> Result<Self, StoreError> {
        let categories = CategoryRepo::list_active(store, scope).await?;
        let brands = BrandRepo::list_active(store).await?;
        Ok(Self::new(categories, brands))
    }

    /// Categories in load order (by id).
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index.get(id).map(|&i| &self.categories[i])
    }

    pub fn has_category(&self, id: &str) -> bool {
        self.category_index.contains_key(id)
    }

    pub fn brand(&self, id: &str) -> Option<&Brand> {
        self.brand_index.get(id).map(|&i| &self.brands[i])
    }

    /// Display name, falling back to the raw id for unknown categories.
    pub fn category_name(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => self
                .category(id)
                .map_or_else(|| id.to_string(), |c| c.name.clone()),
            None => String::new(),
        }
    }

    /// Display name, or empty for unknown brands.
    pub fn brand_name(&self, id: Option<&str>) -> String {
        id.and_then(|id| self.brand(id))
            .map(|b| b.name.clone())
            .unwrap_or_default()
    }

    /// Resolved icon URL for a category, or `default`.
    pub fn icon_for(&self, id: Option<&str>, base: &Url, default: &str) -> String {
        let raw = id
            .and_then(|id| self.category(id))
            .and_then(|c| c.icon_url.as_deref());
        icon_or_default(raw, base, default)
    }

    /// Headline for a marker: "Category · Brand" for products, the title
    /// (or category name) for places.
    pub fn marker_label(&self, marker: &Marker) -> String {
        let category = self.category_name(marker.category_id.as_deref());
        match marker.group_type {
            GroupType::Product => product_label(&category, &self.brand_name(marker.brand_id.as_deref())),
            GroupType::Place => place_label(&marker.title, &category),
        }
    }

    /// Home page chips: categories flagged for the scope, by name, first `limit`.
    pub fn chip_categories(&self, scope: CategoryScope, limit: usize) -> Vec<&Category> {
        let mut chosen: Vec<&Category> = self
            .categories
            .iter()
            .filter(|c| match scope {
                CategoryScope::All => true,
                CategoryScope::Places => c.for_places,
                CategoryScope::Products => c.for_products,
            })
            .collect();
        chosen.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        });
        chosen.truncate(limit);
        chosen
    }

    /// All categories, most used first. Ties keep load order.
    pub fn rank_by_usage(&self, usage: &HashMap<CategoryId, usize>) -> Vec<&Category> {
        let mut ranked: Vec<&Category> = self.categories.iter().collect();
        ranked.sort_by_key(|c| std::cmp::Reverse(usage.get(&c.id).copied().unwrap_or(0)));
        ranked
    }
}
