//! # LinkKora Core
//!
//! Shared, I/O-free logic for LinkKora: data models, brand normalization,
//! source ingestion, catalog snapshots, price parsing, and the search
//! algorithm.
//!
//! This crate contains no tokio, filesystem, or HTTP dependencies. Loaders
//! that talk to files or databases implement [`source::SourceLoader`] in the
//! application crate.

pub mod error;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod price;
pub mod search;
pub mod snapshot;
pub mod source;

pub use error::CatalogError;
pub use models::{Brand, MergedRecord, Product, RawRow};
pub use snapshot::CatalogSnapshot;

/// Display name used for products whose brand key has no brand table entry.
pub const UNKNOWN_BRAND: &str = "Unknown";
