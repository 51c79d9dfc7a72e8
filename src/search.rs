//! CLI entry points for querying the catalog.
//!
//! The search algorithm itself lives in `linkkora_core::search`; this module
//! loads the catalog from config and formats results for the terminal.

use anyhow::Result;

use linkkora_core::search::{SearchEngine, SearchQuery};
use linkkora_core::MergedRecord;

use crate::catalog;
use crate::config::Config;

/// Load the catalog and run one query against it.
pub async fn search_catalog(config: &Config, query: &SearchQuery) -> Result<Vec<MergedRecord>> {
    let repo = catalog::open(config).await?;
    let engine = SearchEngine::new(config.search.order);
    Ok(engine.search(&repo.snapshot(), query))
}

/// CLI entry point: prints results as a numbered list, or as JSON.
pub async fn run_search(config: &Config, query: &SearchQuery, json: bool) -> Result<()> {
    let results = search_catalog(config, query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, r) in results.iter().enumerate() {
        println!("{}. {} / {}", i + 1, r.brand, r.product_name);
        if !r.category.is_empty() {
            println!("    category: {}", r.category);
        }
        if !r.price.is_empty() {
            println!("    price: {}", r.price);
        }
        if !r.product_url.is_empty() {
            println!("    url: {}", r.product_url);
        }
        if !r.brand_website.is_empty() {
            println!("    brand site: {}", r.brand_website);
        }
        println!();
    }

    Ok(())
}

pub async fn run_brands(config: &Config) -> Result<()> {
    let repo = catalog::open(config).await?;
    for name in repo.snapshot().brand_names() {
        println!("{}", name);
    }
    Ok(())
}

pub async fn run_categories(config: &Config) -> Result<()> {
    let repo = catalog::open(config).await?;
    for category in repo.snapshot().categories() {
        println!("{}", category);
    }
    Ok(())
}
