//! Export the merged catalog as JSON.
//!
//! Writes every product joined with its brand, in search output order, plus
//! the brand table and per-source load report. Useful for static storefront
//! builds and for diffing catalog loads.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use linkkora_core::search::SearchEngine;
use linkkora_core::snapshot::SourceReport;
use linkkora_core::{Brand, MergedRecord};

use crate::catalog;
use crate::config::Config;

#[derive(Serialize)]
struct ExportData<'a> {
    loaded_at: String,
    brands: &'a [Brand],
    sources: &'a [SourceReport],
    products: Vec<MergedRecord>,
}

/// If `output` is `Some`, writes to that file path. Otherwise writes to
/// stdout for piping.
pub async fn run_export(config: &Config, output: Option<&Path>) -> Result<()> {
    let repo = catalog::open(config).await?;
    let snapshot = repo.snapshot();
    let products = SearchEngine::new(config.search.order).all(&snapshot);

    let product_count = products.len();
    let data = ExportData {
        loaded_at: snapshot.loaded_at.to_rfc3339(),
        brands: snapshot.brands(),
        sources: snapshot.sources(),
        products,
    };
    let json = serde_json::to_string_pretty(&data)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &json)?;
            tracing::info!(
                brands = snapshot.brands().len(),
                products = product_count,
                path = %path.display(),
                "catalog exported"
            );
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}
