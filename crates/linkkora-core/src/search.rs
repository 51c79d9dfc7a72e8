//! Product search over a [`CatalogSnapshot`].
//!
//! # Algorithm
//!
//! 1. Text match: keyword is a case-insensitive substring of the product
//!    name or category. An empty keyword matches everything.
//! 2. Left join on `brand_key == clean_key`. Unmatched products get brand
//!    [`UNKNOWN_BRAND`] and empty brand metadata.
//! 3. Brand and category equality filters, case-insensitive.
//! 4. Price range, inclusive. When a bound is present, products whose price
//!    cannot be parsed are dropped.
//! 5. Output in ingestion order, or by name when [`ResultOrder::Name`].
//!
//! Filters compose by logical AND. No step fails; an empty candidate set
//! yields an empty list.

use serde::{Deserialize, Serialize};

use crate::models::{MergedRecord, Product};
use crate::normalize::display_name;
use crate::price::parse_price;
use crate::snapshot::CatalogSnapshot;
use crate::UNKNOWN_BRAND;

/// A single search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchQuery {
    pub keyword: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl SearchQuery {
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            ..Self::default()
        }
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn min_price(mut self, min: f64) -> Self {
        self.min_price = Some(min);
        self
    }

    pub fn max_price(mut self, max: f64) -> Self {
        self.max_price = Some(max);
        self
    }

    fn has_price_bound(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some()
    }
}

/// Output ordering for search results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultOrder {
    /// Ingestion order: sources in load order, rows in sheet order.
    #[default]
    Ingestion,
    /// Case-insensitive ascending by product name; ties keep ingestion order.
    Name,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchEngine {
    order: ResultOrder,
}

impl SearchEngine {
    pub fn new(order: ResultOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> ResultOrder {
        self.order
    }

    pub fn search(&self, snapshot: &CatalogSnapshot, query: &SearchQuery) -> Vec<MergedRecord> {
        let keyword = query.keyword.to_lowercase();
        let brand_filter = non_empty_lower(query.brand.as_deref()).map(|b| display_name(&b));
        let category_filter = non_empty_lower(query.category.as_deref());

        let mut results: Vec<MergedRecord> = snapshot
            .products()
            .iter()
            .filter(|p| text_matches(p, &keyword))
            .map(|p| merge(snapshot, p))
            .filter(|r| matches_exact(&r.brand, brand_filter.as_deref()))
            .filter(|r| matches_exact(&r.category, category_filter.as_deref()))
            .filter(|r| within_price(&r.price, query))
            .collect();

        if self.order == ResultOrder::Name {
            // Stable: equal names stay in ingestion order.
            results.sort_by_cached_key(|r| r.product_name.to_lowercase());
        }
        results
    }

    /// Every product in the snapshot, merged, in the configured order.
    pub fn all(&self, snapshot: &CatalogSnapshot) -> Vec<MergedRecord> {
        self.search(snapshot, &SearchQuery::default())
    }
}

fn non_empty_lower(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn text_matches(product: &Product, keyword: &str) -> bool {
    keyword.is_empty()
        || product.name.to_lowercase().contains(keyword)
        || product.category.to_lowercase().contains(keyword)
}

/// Left-join one product against the brand index.
pub fn merge(snapshot: &CatalogSnapshot, product: &Product) -> MergedRecord {
    let brand = snapshot.brand_for(&product.brand_key);
    MergedRecord {
        product_name: product.name.clone(),
        product_url: product.url.clone(),
        category: product.category.clone(),
        brand: brand
            .map(|b| b.display_name.clone())
            .unwrap_or_else(|| UNKNOWN_BRAND.to_string()),
        price: product.price_raw.clone(),
        image_url: product.image_url.clone(),
        description: product.description.clone(),
        brand_website: brand.map(|b| b.website().to_string()).unwrap_or_default(),
        brand_description: brand.map(|b| b.description.clone()).unwrap_or_default(),
    }
}

fn matches_exact(value: &str, filter: Option<&str>) -> bool {
    match filter {
        Some(f) => value.trim().to_lowercase() == f,
        None => true,
    }
}

fn within_price(raw: &str, query: &SearchQuery) -> bool {
    if !query.has_price_bound() {
        return true;
    }
    let Ok(price) = parse_price(raw) else {
        return false;
    };
    query.min_price.map_or(true, |min| min <= price)
        && query.max_price.map_or(true, |max| price <= max)
}
