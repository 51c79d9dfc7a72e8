//! # LinkKora
//!
//! Product catalog ingestion and search across many brand sheets.
//!
//! Each brand's products arrive as their own table with its own column
//! names. LinkKora resolves those columns onto one product shape, derives a
//! canonical brand key, joins products to the brand table, and serves
//! keyword, brand, category, and price-range queries over the result.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌────────────────┐
//! │   Loaders    │──▶│   Ingestor   │──▶│    Snapshot    │
//! │  CSV / JSON  │   │ alias + key  │   │ brands+products│
//! └──────────────┘   └──────────────┘   └───────┬────────┘
//!                                               │
//!                        ┌──────────────────────┤
//!                        ▼                      ▼
//!                  ┌──────────┐           ┌──────────┐
//!                  │   CLI    │           │   HTTP   │
//!                  │(linkkora)│           │  (axum)  │
//!                  └──────────┘           └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`catalog`] | Snapshot repository with atomic reload |
//! | [`connector_csv`] | Directory-of-CSV loader |
//! | [`connector_json`] | JSON workbook loader |
//! | [`search`] | CLI search, brand, and category listing |
//! | [`server`] | HTTP server |
//! | [`sources`] | Per-source load report |
//! | [`export`] | Merged catalog JSON export |
//! | [`logging`] | Tracing subscriber setup |
//!
//! The pipeline itself (normalization, ingestion, join, filters) lives in
//! the `linkkora-core` crate.

pub mod catalog;
pub mod config;
pub mod connector_csv;
pub mod connector_json;
pub mod export;
pub mod logging;
pub mod search;
pub mod server;
pub mod sources;
