use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use linkkora_core::ingest::{CanonicalField, ColumnAliases, IngestSettings, DEFAULT_SKIP};
use linkkora_core::search::ResultOrder;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    pub sources: SourcesConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// Brand table file. Required for `csv_dir` sources; the JSON workbook
    /// may carry its own `brands` array instead.
    pub brands: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    CsvDir,
    Json,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourcesConfig {
    #[serde(default = "default_kind")]
    pub kind: SourceKind,
    pub path: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default = "default_skip")]
    pub skip: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra column aliases: column name → canonical field.
    #[serde(default)]
    pub aliases: HashMap<String, CanonicalField>,
}

fn default_kind() -> SourceKind {
    SourceKind::CsvDir
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.csv".to_string()]
}
fn default_skip() -> Vec<String> {
    DEFAULT_SKIP.iter().map(|s| s.to_string()).collect()
}
fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SearchConfig {
    #[serde(default)]
    pub order: ResultOrder,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5050".to_string()
}

impl SourcesConfig {
    pub fn ingest_settings(&self) -> IngestSettings {
        IngestSettings::new(
            ColumnAliases::with_extra(&self.aliases),
            self.skip.iter().cloned(),
        )
    }
}

impl Config {
    /// Bind address with the port replaced by `port`, if given.
    ///
    /// Hosting platforms inject the listening port through `PORT`.
    pub fn bind_with_port(&self, port: Option<&str>) -> Result<String> {
        let Some(port) = port.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(self.server.bind.clone());
        };
        let port: u16 = port
            .parse()
            .with_context(|| format!("PORT is not a valid port number: {}", port))?;
        let host = self
            .server
            .bind
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or("0.0.0.0");
        Ok(format!("{}:{}", host, port))
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let mut config: Config =
        toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.sources.timeout_secs == 0 {
        anyhow::bail!("sources.timeout_secs must be > 0");
    }

    if config.sources.kind == SourceKind::CsvDir && config.catalog.brands.is_none() {
        anyhow::bail!("catalog.brands must be set when sources.kind is 'csv_dir'");
    }

    // Relative paths are resolved against the config file's directory.
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    config.sources.path = resolve(base, &config.sources.path);
    config.catalog.brands = config.catalog.brands.as_deref().map(|p| resolve(base, p));

    Ok(config)
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
