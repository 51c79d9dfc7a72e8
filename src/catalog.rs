//! Catalog repository: builds, holds, and reloads the published snapshot.
//!
//! Searches read the current [`CatalogSnapshot`] through an `Arc` taken
//! under a short read lock and then scan without holding any lock. A reload
//! builds a fresh snapshot off to the side and swaps the `Arc` in one step,
//! so readers see either the old catalog or the new one, never a mix.
//! Reloads are serialized; a failed reload leaves the old snapshot live.
//!
//! Every loader call is bounded by the configured timeout. A product source
//! that times out or fails to read is logged and skipped.

use anyhow::Result;
use parking_lot::RwLock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use linkkora_core::ingest::{ingest_brands, ingest_source, IngestSettings, SourceOutcome};
use linkkora_core::snapshot::SnapshotBuilder;
use linkkora_core::source::SourceLoader;
use linkkora_core::{CatalogError, CatalogSnapshot};

use crate::config::{Config, SourceKind};
use crate::connector_csv::CsvDirLoader;
use crate::connector_json::JsonWorkbookLoader;

pub struct CatalogRepository {
    loader: Arc<dyn SourceLoader>,
    settings: IngestSettings,
    timeout: Duration,
    current: RwLock<Arc<CatalogSnapshot>>,
    reload_lock: Mutex<()>,
}

impl CatalogRepository {
    /// Build the first snapshot. Fails if no catalog could be assembled.
    pub async fn load(
        loader: Arc<dyn SourceLoader>,
        settings: IngestSettings,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let snapshot = build_snapshot(loader.as_ref(), &settings, timeout, 1).await?;
        Ok(Self {
            loader,
            settings,
            timeout,
            current: RwLock::new(Arc::new(snapshot)),
            reload_lock: Mutex::new(()),
        })
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current.read().clone()
    }

    /// Rebuild from the loader and publish the result.
    ///
    /// On failure the previous snapshot stays published and the error is
    /// returned.
    pub async fn reload(&self) -> Result<Arc<CatalogSnapshot>, CatalogError> {
        let _guard = self.reload_lock.lock().await;
        let generation = self.snapshot().generation + 1;

        match build_snapshot(self.loader.as_ref(), &self.settings, self.timeout, generation).await
        {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                *self.current.write() = snapshot.clone();
                tracing::info!(
                    generation,
                    brands = snapshot.brands().len(),
                    products = snapshot.products().len(),
                    "catalog reloaded"
                );
                Ok(snapshot)
            }
            Err(e) => {
                tracing::error!(error = %e, "catalog reload failed, keeping previous snapshot");
                Err(e)
            }
        }
    }

    pub fn describe(&self) -> String {
        self.loader.describe()
    }
}

/// Loader for the configured source kind.
pub fn loader_from_config(config: &Config) -> Result<Arc<dyn SourceLoader>> {
    Ok(match config.sources.kind {
        SourceKind::CsvDir => Arc::new(CsvDirLoader::from_config(config)?),
        SourceKind::Json => Arc::new(JsonWorkbookLoader::from_config(config)),
    })
}

/// Load the catalog described by `config`.
pub async fn open(config: &Config) -> Result<CatalogRepository> {
    let loader = loader_from_config(config)?;
    tracing::debug!(loader = %loader.describe(), "loading catalog");
    let repo = CatalogRepository::load(
        loader,
        config.sources.ingest_settings(),
        Duration::from_secs(config.sources.timeout_secs),
    )
    .await?;
    Ok(repo)
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, String>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{:#}", e)),
        Err(_) => Err(format!("timed out after {}s", timeout.as_secs_f64())),
    }
}

async fn build_snapshot(
    loader: &dyn SourceLoader,
    settings: &IngestSettings,
    timeout: Duration,
    generation: u64,
) -> Result<CatalogSnapshot, CatalogError> {
    let brand_rows = bounded(timeout, loader.brand_rows())
        .await
        .map_err(|e| CatalogError::reload(format!("brand table: {}", e)))?;
    let table = ingest_brands(&brand_rows);
    for key in &table.duplicates {
        tracing::warn!(brand = %key, "duplicate brand in brand table, first entry kept");
    }

    let names = bounded(timeout, loader.source_names())
        .await
        .map_err(|e| CatalogError::reload(format!("listing sources: {}", e)))?;

    let mut builder = SnapshotBuilder::new(table);
    for name in &names {
        if settings.is_skipped(name) {
            tracing::debug!(source = %name, "source in skip list");
            builder.add_outcome(name, SourceOutcome::Skipped);
            continue;
        }

        let rows = match bounded(timeout, loader.read_source(name)).await {
            Ok(rows) => rows,
            Err(reason) => {
                let err = CatalogError::unavailable(name.as_str(), reason);
                tracing::warn!(source = %name, error = %err, "skipping source");
                builder.add_failure(name, &err);
                continue;
            }
        };

        let outcome = ingest_source(name, &rows, settings);
        match &outcome {
            SourceOutcome::Ingested { products, warnings } => {
                for w in warnings {
                    tracing::debug!(source = %name, "{}", w);
                }
                tracing::info!(source = %name, products = products.len(), "source ingested");
            }
            SourceOutcome::Empty => tracing::debug!(source = %name, "source has no rows"),
            SourceOutcome::Skipped => tracing::debug!(source = %name, "source in skip list"),
        }
        builder.add_outcome(name, outcome);
    }

    let snapshot = builder.finish(generation);
    if snapshot.readable_sources() == 0 {
        return Err(CatalogError::reload(format!(
            "no product source could be read ({} listed)",
            names.len()
        )));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use linkkora_core::search::{SearchEngine, SearchQuery};
    use linkkora_core::source::MemoryLoader;
    use linkkora_core::RawRow;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    /// Wraps a [`MemoryLoader`]; one source hangs, and the whole loader can
    /// be switched to failing.
    struct FlakyLoader {
        inner: MemoryLoader,
        slow: &'static str,
        broken: AtomicBool,
    }

    #[async_trait]
    impl SourceLoader for FlakyLoader {
        fn describe(&self) -> String {
            "flaky".to_string()
        }

        async fn brand_rows(&self) -> Result<Vec<RawRow>> {
            self.inner.brand_rows().await
        }

        async fn source_names(&self) -> Result<Vec<String>> {
            if self.broken.load(Ordering::SeqCst) {
                anyhow::bail!("backend down");
            }
            self.inner.source_names().await
        }

        async fn read_source(&self, name: &str) -> Result<Vec<RawRow>> {
            if name == self.slow {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.inner.read_source(name).await
        }
    }

    fn flaky() -> Arc<FlakyLoader> {
        let inner = MemoryLoader::new(vec![row(&[("brand", "Brand A"), ("description", "d")])])
            .with_source(
                "Brand A",
                vec![row(&[
                    ("product_name", "Red Shirt"),
                    ("category", "Tops"),
                    ("product_price", "1,000 Tk"),
                ])],
            )
            .with_source("Slow Brand", vec![row(&[("product_name", "Slow Shirt")])])
            .with_source("brand name", vec![row(&[("product_name", "Index Shirt")])]);
        Arc::new(FlakyLoader {
            inner,
            slow: "Slow Brand",
            broken: AtomicBool::new(false),
        })
    }

    #[tokio::test]
    async fn test_timeout_skips_only_slow_source() {
        let repo = CatalogRepository::load(
            flaky(),
            IngestSettings::default(),
            Duration::from_millis(100),
        )
        .await
        .unwrap();
        let snap = repo.snapshot();
        let names: Vec<&str> = snap.products().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Red Shirt"]);
        let slow = snap.sources().iter().find(|s| s.name == "Slow Brand").unwrap();
        assert!(slow.detail.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn test_reload_swaps_and_keeps_old_on_failure() {
        let loader = flaky();
        let repo = CatalogRepository::load(
            loader.clone(),
            IngestSettings::default(),
            Duration::from_millis(100),
        )
        .await
        .unwrap();
        let before = repo.snapshot();
        assert_eq!(before.generation, 1);

        let after = repo.reload().await.unwrap();
        assert_eq!(after.generation, 2);
        assert_eq!(repo.snapshot().generation, 2);
        // Readers holding the old snapshot are unaffected.
        assert_eq!(before.generation, 1);
        assert_eq!(before.products().len(), 1);

        loader.broken.store(true, Ordering::SeqCst);
        let err = repo.reload().await.unwrap_err();
        assert!(matches!(err, CatalogError::ReloadFailure { .. }));
        assert_eq!(repo.snapshot().generation, 2);

        let results = SearchEngine::default().search(&repo.snapshot(), &SearchQuery::keyword("shirt"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].brand_description, "d");
    }

    #[tokio::test]
    async fn test_no_readable_source_fails_load() {
        let loader = MemoryLoader::new(Vec::new()).with_source("Sheet7", vec![row(&[("name", "x")])]);
        let err = CatalogRepository::load(
            Arc::new(loader),
            IngestSettings::default(),
            Duration::from_secs(1),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, CatalogError::ReloadFailure { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_reloads_serialize() {
        let repo = Arc::new(
            CatalogRepository::load(flaky(), IngestSettings::default(), Duration::from_millis(50))
                .await
                .unwrap(),
        );
        let a = tokio::spawn({
            let repo = repo.clone();
            async move { repo.reload().await.map(|s| s.generation) }
        });
        let b = tokio::spawn({
            let repo = repo.clone();
            async move { repo.reload().await.map(|s| s.generation) }
        });
        let mut generations = vec![a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];
        generations.sort();
        assert_eq!(generations, vec![2, 3]);
        assert_eq!(repo.snapshot().generation, 3);
    }
}
