//! Source loading abstraction.
//!
//! The [`SourceLoader`] trait is the seam between the pipeline and wherever
//! rows actually live: a directory of CSV files, a workbook export, a
//! database query. Loaders hand back raw rows only; all column handling
//! happens in [`crate::ingest`].
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::RawRow;

#[async_trait]
pub trait SourceLoader: Send + Sync {
    /// Short label for logs and `sources` output (e.g. `"csv_dir:data/products"`).
    fn describe(&self) -> String;

    /// Rows of the brand table.
    async fn brand_rows(&self) -> Result<Vec<RawRow>>;

    /// Names of all product sources, in load order.
    async fn source_names(&self) -> Result<Vec<String>>;

    /// Rows of one product source.
    async fn read_source(&self, name: &str) -> Result<Vec<RawRow>>;
}

/// In-memory loader for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    brands: Vec<RawRow>,
    sources: Vec<(String, Vec<RawRow>)>,
}

impl MemoryLoader {
    pub fn new(brands: Vec<RawRow>) -> Self {
        Self {
            brands,
            sources: Vec::new(),
        }
    }

    pub fn with_source(mut self, name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        self.sources.push((name.into(), rows));
        self
    }
}

#[async_trait]
impl SourceLoader for MemoryLoader {
    fn describe(&self) -> String {
        format!("memory:{} sources", self.sources.len())
    }

    async fn brand_rows(&self) -> Result<Vec<RawRow>> {
        Ok(self.brands.clone())
    }

    async fn source_names(&self) -> Result<Vec<String>> {
        Ok(self.sources.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn read_source(&self, name: &str) -> Result<Vec<RawRow>> {
        self.sources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, rows)| rows.clone())
            .ok_or_else(|| anyhow!("no source named '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_loader_preserves_order() {
        let loader = MemoryLoader::new(Vec::new())
            .with_source("Zeta", Vec::new())
            .with_source("Alpha", vec![RawRow::new()]);
        assert_eq!(loader.source_names().await.unwrap(), vec!["Zeta", "Alpha"]);
        assert_eq!(loader.read_source("Alpha").await.unwrap().len(), 1);
        assert!(loader.read_source("Missing").await.is_err());
    }
}
