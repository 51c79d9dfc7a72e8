use anyhow::Result;

use linkkora_core::snapshot::SourceReport;

use crate::catalog;
use crate::config::Config;

/// Load the catalog and report how each source fared.
pub async fn get_sources(config: &Config) -> Result<Vec<SourceReport>> {
    let repo = catalog::open(config).await?;
    Ok(repo.snapshot().sources().to_vec())
}

pub async fn list_sources(config: &Config) -> Result<()> {
    let sources = get_sources(config).await?;

    println!("{:<28} {:<10} {:>8}  DETAIL", "SOURCE", "STATUS", "PRODUCTS");
    for s in &sources {
        let status = serde_json::to_value(s.status)?;
        println!(
            "{:<28} {:<10} {:>8}  {}",
            s.name,
            status.as_str().unwrap_or_default(),
            s.products,
            s.detail.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
