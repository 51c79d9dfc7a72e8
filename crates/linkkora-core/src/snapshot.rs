//! Immutable catalog snapshots.
//!
//! A [`CatalogSnapshot`] holds the brand table, the concatenated product
//! table, and a hash index from clean key to brand. It is assembled by a
//! [`SnapshotBuilder`] and never mutated once built; reloads build a new
//! one and publish it whole.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::error::CatalogError;
use crate::ingest::{BrandTable, SourceOutcome};
use crate::models::{Brand, Product};

/// How a single source fared during a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Ok,
    Skipped,
    Empty,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub name: String,
    pub status: SourceStatus,
    pub products: usize,
    /// Failure reason, or the missing canonical columns of an ingested source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    brands: Vec<Brand>,
    products: Vec<Product>,
    brand_index: HashMap<String, usize>,
    sources: Vec<SourceReport>,
}

impl CatalogSnapshot {
    /// A snapshot with no brands, products, or sources.
    pub fn empty() -> Self {
        SnapshotBuilder::new(BrandTable::default()).finish(0)
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    /// Products in ingestion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn sources(&self) -> &[SourceReport] {
        &self.sources
    }

    /// Brand whose clean key equals `key`.
    pub fn brand_for(&self, key: &str) -> Option<&Brand> {
        self.brand_index.get(key).map(|&i| &self.brands[i])
    }

    /// Number of sources that were read successfully (ingested or empty).
    pub fn readable_sources(&self) -> usize {
        self.sources
            .iter()
            .filter(|s| matches!(s.status, SourceStatus::Ok | SourceStatus::Empty))
            .count()
    }

    /// Distinct brand names, sorted.
    pub fn brand_names(&self) -> Vec<String> {
        let names: BTreeSet<&str> = self.brands.iter().map(|b| b.display_name.as_str()).collect();
        names.into_iter().map(String::from).collect()
    }

    /// Distinct non-empty categories, sorted case-insensitively.
    ///
    /// Categories differing only in case or surrounding whitespace are
    /// listed once, in the spelling first seen.
    pub fn categories(&self) -> Vec<String> {
        let mut seen: HashMap<String, &str> = HashMap::new();
        for product in &self.products {
            let category = product.category.trim();
            if category.is_empty() {
                continue;
            }
            seen.entry(category.to_lowercase()).or_insert(category);
        }
        let mut categories: Vec<(String, &str)> = seen.into_iter().collect();
        categories.sort_by(|a, b| a.0.cmp(&b.0));
        categories.into_iter().map(|(_, c)| c.to_string()).collect()
    }
}

/// Accumulates per-source results into a snapshot, preserving source order.
pub struct SnapshotBuilder {
    brands: Vec<Brand>,
    products: Vec<Product>,
    sources: Vec<SourceReport>,
}

impl SnapshotBuilder {
    pub fn new(table: BrandTable) -> Self {
        Self {
            brands: table.brands,
            products: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn add_outcome(&mut self, name: &str, outcome: SourceOutcome) {
        let report = match outcome {
            SourceOutcome::Skipped => SourceReport {
                name: name.to_string(),
                status: SourceStatus::Skipped,
                products: 0,
                detail: None,
            },
            SourceOutcome::Empty => SourceReport {
                name: name.to_string(),
                status: SourceStatus::Empty,
                products: 0,
                detail: None,
            },
            SourceOutcome::Ingested { products, warnings } => {
                let missing: Vec<String> = warnings
                    .iter()
                    .filter_map(|w| match w {
                        CatalogError::SchemaMismatch { column, .. } => Some(column.clone()),
                        _ => None,
                    })
                    .collect();
                let report = SourceReport {
                    name: name.to_string(),
                    status: SourceStatus::Ok,
                    products: products.len(),
                    detail: (!missing.is_empty())
                        .then(|| format!("missing columns: {}", missing.join(", "))),
                };
                self.products.extend(products);
                report
            }
        };
        self.sources.push(report);
    }

    pub fn add_failure(&mut self, name: &str, error: &CatalogError) {
        let reason = match error {
            CatalogError::SourceUnavailable { reason, .. } => reason.clone(),
            other => other.to_string(),
        };
        self.sources.push(SourceReport {
            name: name.to_string(),
            status: SourceStatus::Failed,
            products: 0,
            detail: Some(reason),
        });
    }

    pub fn finish(self, generation: u64) -> CatalogSnapshot {
        let brand_index = self
            .brands
            .iter()
            .enumerate()
            .map(|(i, b)| (b.clean_key.clone(), i))
            .collect();
        CatalogSnapshot {
            generation,
            loaded_at: Utc::now(),
            brands: self.brands,
            products: self.products,
            brand_index,
            sources: self.sources,
        }
    }
}
