//! CSV directory loader.
//!
//! Each CSV file under the products directory is one source (one brand
//! sheet), named after its file stem: `data/products/Brand A.csv` becomes
//! source `"Brand A"`. The brand table is a separate CSV file.
//!
//! `source_names` records where each source lives; `read_source` looks
//! names up there instead of walking the directory again.
//!
//! Files are read on the blocking thread pool so that per-source timeouts
//! in [`crate::catalog`] can fire while a read is stuck.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use linkkora_core::source::SourceLoader;
use linkkora_core::RawRow;

use crate::config::Config;

pub struct CsvDirLoader {
    brands: PathBuf,
    root: PathBuf,
    include: GlobSet,
    /// Source name → file, from the latest listing.
    resolved: Mutex<HashMap<String, PathBuf>>,
}

impl CsvDirLoader {
    pub fn new(brands: PathBuf, root: PathBuf, include_globs: &[String]) -> Result<Self> {
        Ok(Self {
            brands,
            root,
            include: build_globset(include_globs)?,
            resolved: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let brands = config
            .catalog
            .brands
            .clone()
            .ok_or_else(|| anyhow::anyhow!("catalog.brands is not configured"))?;
        Self::new(
            brands,
            config.sources.path.clone(),
            &config.sources.include_globs,
        )
    }

    /// Matching files as `(source name, path)`, sorted by relative path.
    fn scan(&self) -> Result<Vec<(String, PathBuf)>> {
        if !self.root.is_dir() {
            bail!("products directory does not exist: {}", self.root.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if !self.include.is_match(relative) {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            files.push((stem, path.to_path_buf()));
        }

        let mut seen = HashSet::new();
        files.retain(|(name, path)| {
            let fresh = seen.insert(name.clone());
            if !fresh {
                tracing::warn!(source = %name, path = %path.display(), "duplicate source name, file ignored");
            }
            fresh
        });
        Ok(files)
    }
}

#[async_trait]
impl SourceLoader for CsvDirLoader {
    fn describe(&self) -> String {
        format!("csv_dir:{}", self.root.display())
    }

    async fn brand_rows(&self) -> Result<Vec<RawRow>> {
        let path = self.brands.clone();
        tokio::task::spawn_blocking(move || read_csv_rows(&path)).await?
    }

    async fn source_names(&self) -> Result<Vec<String>> {
        let files = self.scan()?;
        let names = files.iter().map(|(name, _)| name.clone()).collect();
        *self.resolved.lock() = files.into_iter().collect();
        Ok(names)
    }

    async fn read_source(&self, name: &str) -> Result<Vec<RawRow>> {
        let cached = self.resolved.lock().get(name).cloned();
        let path = match cached {
            Some(path) => path,
            None => self
                .scan()?
                .into_iter()
                .find(|(n, _)| n == name)
                .map(|(_, p)| p)
                .ok_or_else(|| anyhow::anyhow!("no CSV file for source '{}'", name))?,
        };
        tokio::task::spawn_blocking(move || read_csv_rows(&path)).await?
    }
}

/// Read a CSV file with a header row into raw rows.
///
/// Rows whose field count differs from the header are a hard error: the
/// file is treated as malformed rather than guessed at.
pub fn read_csv_rows(path: &Path) -> Result<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("{}: malformed record {}", path.display(), i + 1))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .filter(|(header, _)| !header.trim().is_empty())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        // `*` stays within one directory level; `**` crosses them.
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, CsvDirLoader) {
        let tmp = TempDir::new().unwrap();
        let products = tmp.path().join("products");
        fs::create_dir_all(products.join("archive")).unwrap();
        fs::write(
            tmp.path().join("brands.csv"),
            "brand,description,website link,social media\nBrand A,d,https://a.example,\n",
        )
        .unwrap();
        fs::write(
            products.join("Brand A.csv"),
            "product_name,category,product_price\nRed Shirt,Tops,\"1,000 Tk\"\n,,\n",
        )
        .unwrap();
        fs::write(products.join("Yellow.csv"), "Product Name,Price\nPolo,900\n").unwrap();
        fs::write(products.join("archive/Old.csv"), "name\nx\n").unwrap();
        fs::write(products.join("notes.txt"), "ignored").unwrap();
        let loader = CsvDirLoader::new(
            tmp.path().join("brands.csv"),
            products,
            &["*.csv".to_string()],
        )
        .unwrap();
        (tmp, loader)
    }

    #[tokio::test]
    async fn test_source_names_from_stems() {
        let (_tmp, loader) = fixture();
        let names = loader.source_names().await.unwrap();
        assert_eq!(names, vec!["Brand A", "Yellow"]);
    }

    #[tokio::test]
    async fn test_read_source_rows() {
        let (_tmp, loader) = fixture();
        let rows = loader.read_source("Brand A").await.unwrap();
        assert_eq!(rows.len(), 1, "blank rows are dropped");
        assert_eq!(rows[0]["product_price"], "1,000 Tk");
        assert_eq!(rows[0]["product_name"], "Red Shirt");
    }

    #[tokio::test]
    async fn test_brand_rows() {
        let (_tmp, loader) = fixture();
        let rows = loader.brand_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["website link"], "https://a.example");
    }

    #[tokio::test]
    async fn test_read_uses_listed_paths() {
        let (tmp, loader) = fixture();
        loader.source_names().await.unwrap();
        // A file added after listing is not picked up until the next listing.
        fs::write(tmp.path().join("products/Late.csv"), "name\nx\n").unwrap();
        assert_eq!(loader.read_source("Yellow").await.unwrap()[0]["Price"], "900");
        assert_eq!(loader.resolved.lock().len(), 2);
        loader.source_names().await.unwrap();
        assert_eq!(loader.resolved.lock().len(), 3);
    }

    #[tokio::test]
    async fn test_read_without_listing_scans() {
        let (_tmp, loader) = fixture();
        assert_eq!(loader.read_source("Brand A").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_source_is_error() {
        let (_tmp, loader) = fixture();
        assert!(loader.read_source("Nope").await.is_err());
    }

    #[test]
    fn test_malformed_csv_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.csv");
        fs::write(&path, "a,b\n1,2,3\n").unwrap();
        assert!(read_csv_rows(&path).is_err());
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let loader = CsvDirLoader::new(
            tmp.path().join("brands.csv"),
            tmp.path().join("absent"),
            &["**/*.csv".to_string()],
        )
        .unwrap();
        assert!(loader.source_names().await.is_err());
    }
}
