//! HTTP server for catalog search.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/search` | Search products (`q`, `brand`, `category`, `min_price`, `max_price`) |
//! | `GET`  | `/brands` | Sorted distinct brand names |
//! | `GET`  | `/categories` | Sorted distinct categories |
//! | `GET`  | `/health` | Status, version, and snapshot counts |
//! | `POST` | `/reload` | Rebuild the catalog from its sources |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "reload_failed", "message": "..." } }
//! ```
//!
//! Malformed price bounds are not errors: the bound is ignored and the
//! search runs without it.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted; the storefront is served
//! from a different origin.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use linkkora_core::price::parse_price;
use linkkora_core::search::{SearchEngine, SearchQuery};
use linkkora_core::{CatalogSnapshot, MergedRecord};

use crate::catalog::CatalogRepository;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogRepository>,
    pub engine: SearchEngine,
}

/// Build the router. Split from [`run_server`] so tests can bind their own
/// listener.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(handle_search))
        .route("/brands", get(handle_brands))
        .route("/categories", get(handle_categories))
        .route("/health", get(handle_health))
        .route("/reload", post(handle_reload))
        .layer(cors)
        .with_state(state)
}

/// Bind to `bind_addr` and serve until the process is terminated.
pub async fn run_server(state: AppState, bind_addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, source = %state.catalog.describe(), "catalog server listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

// ============ GET /search ============

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl SearchParams {
    /// Convert into a query. Unreadable price bounds are dropped with a
    /// warning.
    pub fn into_query(self) -> SearchQuery {
        SearchQuery {
            keyword: self.q,
            brand: self.brand,
            category: self.category,
            min_price: price_bound("min_price", self.min_price.as_deref()),
            max_price: price_bound("max_price", self.max_price.as_deref()),
        }
    }
}

fn price_bound(name: &str, raw: Option<&str>) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    match parse_price(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(param = name, error = %e, "ignoring price filter");
            None
        }
    }
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<MergedRecord>> {
    let snapshot = state.catalog.snapshot();
    let query = params.into_query();
    let results = state.engine.search(&snapshot, &query);
    tracing::debug!(keyword = %query.keyword, results = results.len(), "search");
    Json(results)
}

// ============ GET /brands, /categories ============

async fn handle_brands(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.snapshot().brand_names())
}

async fn handle_categories(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.catalog.snapshot().categories())
}

// ============ GET /health, POST /reload ============

#[derive(Serialize)]
struct CatalogStatus {
    status: String,
    version: String,
    generation: u64,
    brands: usize,
    products: usize,
    sources: usize,
    loaded_at: String,
}

impl CatalogStatus {
    fn of(snapshot: &CatalogSnapshot) -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generation: snapshot.generation,
            brands: snapshot.brands().len(),
            products: snapshot.products().len(),
            sources: snapshot.readable_sources(),
            loaded_at: snapshot.loaded_at.to_rfc3339(),
        }
    }
}

async fn handle_health(State(state): State<AppState>) -> Json<CatalogStatus> {
    Json(CatalogStatus::of(&state.catalog.snapshot()))
}

async fn handle_reload(State(state): State<AppState>) -> Result<Json<CatalogStatus>, AppError> {
    let snapshot = state.catalog.reload().await.map_err(|e| AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "reload_failed".to_string(),
        message: e.to_string(),
    })?;
    Ok(Json(CatalogStatus::of(&snapshot)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_price_bounds_are_dropped() {
        let params = SearchParams {
            q: "shirt".into(),
            min_price: Some("cheap".into()),
            max_price: Some("2,000 Tk".into()),
            ..SearchParams::default()
        };
        let query = params.into_query();
        assert_eq!(query.min_price, None);
        assert_eq!(query.max_price, Some(2000.0));
    }

    #[test]
    fn test_blank_price_bound_is_absent() {
        let params = SearchParams {
            min_price: Some("  ".into()),
            ..SearchParams::default()
        };
        assert_eq!(params.into_query().min_price, None);
    }
}
