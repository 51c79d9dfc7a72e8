//! JSON workbook loader.
//!
//! Mirrors a multi-sheet spreadsheet exported to one JSON file:
//!
//! ```json
//! {
//!   "brands": [ { "brand": "Brand A", "description": "..." } ],
//!   "sheets": [
//!     { "name": "Brand A", "rows": [ { "product_name": "Red Shirt", "product_price": 1000 } ] }
//!   ]
//! }
//! ```
//!
//! Sheet order in the file is load order. Non-string cells are rendered as
//! text; `null` becomes an empty string. When `catalog.brands` is configured
//! the brand table is read from that CSV file instead of the `brands` array.
//!
//! The workbook is parsed once per listing: `source_names` refreshes the
//! cached copy and `read_source` serves sheets from it.
//!
//! A sheet whose `rows` is not an array of objects fails on its own when
//! read; the other sheets stay readable.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use linkkora_core::source::SourceLoader;
use linkkora_core::RawRow;

use crate::config::Config;
use crate::connector_csv::read_csv_rows;

#[derive(Debug, Deserialize)]
struct Workbook {
    #[serde(default)]
    brands: Vec<Value>,
    #[serde(default)]
    sheets: Vec<Sheet>,
}

#[derive(Debug, Deserialize)]
struct Sheet {
    name: String,
    #[serde(default)]
    rows: Value,
}

pub struct JsonWorkbookLoader {
    path: PathBuf,
    brands_csv: Option<PathBuf>,
    listed: Mutex<Option<Arc<Workbook>>>,
}

impl JsonWorkbookLoader {
    pub fn new(path: PathBuf, brands_csv: Option<PathBuf>) -> Self {
        Self {
            path,
            brands_csv,
            listed: Mutex::new(None),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.sources.path.clone(), config.catalog.brands.clone())
    }

    async fn workbook(&self) -> Result<Arc<Workbook>> {
        let path = self.path.clone();
        let workbook = tokio::task::spawn_blocking(move || read_workbook(&path)).await??;
        Ok(Arc::new(workbook))
    }

    /// The workbook from the latest listing, parsing it if nothing is cached.
    async fn listed_workbook(&self) -> Result<Arc<Workbook>> {
        let cached = self.listed.lock().clone();
        match cached {
            Some(workbook) => Ok(workbook),
            None => self.workbook().await,
        }
    }
}

fn read_workbook(path: &Path) -> Result<Workbook> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read workbook: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse workbook: {}", path.display()))
}

#[async_trait]
impl SourceLoader for JsonWorkbookLoader {
    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }

    async fn brand_rows(&self) -> Result<Vec<RawRow>> {
        if let Some(csv) = self.brands_csv.clone() {
            return tokio::task::spawn_blocking(move || read_csv_rows(&csv)).await?;
        }
        self.workbook()
            .await?
            .brands
            .iter()
            .map(value_to_row)
            .collect::<Result<Vec<_>>>()
            .context("brands")
    }

    async fn source_names(&self) -> Result<Vec<String>> {
        let workbook = self.workbook().await?;
        let names = workbook.sheets.iter().map(|s| s.name.clone()).collect();
        *self.listed.lock() = Some(workbook);
        Ok(names)
    }

    async fn read_source(&self, name: &str) -> Result<Vec<RawRow>> {
        let workbook = self.listed_workbook().await?;
        let sheet = workbook
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| anyhow!("no sheet named '{}'", name))?;

        match &sheet.rows {
            Value::Null => Ok(Vec::new()),
            Value::Array(rows) => rows.iter().map(value_to_row).collect(),
            other => bail!("sheet '{}': rows must be an array, got {}", name, kind(other)),
        }
    }
}

fn value_to_row(value: &Value) -> Result<RawRow> {
    let Value::Object(map) = value else {
        bail!("row must be an object, got {}", kind(value));
    };
    Ok(map
        .iter()
        .map(|(column, cell)| (column.clone(), cell_text(cell)))
        .collect())
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
