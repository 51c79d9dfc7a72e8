//! # LinkKora CLI (`linkkora`)
//!
//! Loads the brand table and every product source named in the config,
//! then answers queries from the command line or over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! linkkora --config ./config/linkkora.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `linkkora sources` | Load every source and report status and product counts |
//! | `linkkora search "<q>"` | Search products with optional filters |
//! | `linkkora brands` | List brand names |
//! | `linkkora categories` | List product categories |
//! | `linkkora export` | Write the merged catalog as JSON |
//! | `linkkora serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! linkkora search shirt --brand "Brand A" --max-price 2000
//! linkkora search "" --category tops --json
//! PORT=8080 linkkora serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use linkkora::{catalog, config, export, logging, search, server, sources};
use linkkora_core::price::parse_price;
use linkkora_core::search::{SearchEngine, SearchQuery};

/// LinkKora: multi-brand product catalog search.
#[derive(Parser)]
#[command(
    name = "linkkora",
    about = "LinkKora: ingest brand product sheets and search the merged catalog",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/linkkora.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every source and report how each one fared.
    Sources,

    /// Search the catalog.
    ///
    /// The keyword matches product names and categories, case-insensitively.
    /// Pass an empty string to match everything.
    Search {
        /// Keyword to search for.
        query: String,

        /// Only products of this brand (display name, case-insensitive).
        #[arg(long)]
        brand: Option<String>,

        /// Only products in this category (case-insensitive).
        #[arg(long)]
        category: Option<String>,

        /// Minimum price, inclusive. Accepts `1500` or `1,500 Tk`.
        #[arg(long)]
        min_price: Option<String>,

        /// Maximum price, inclusive.
        #[arg(long)]
        max_price: Option<String>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List brand names from the brand table.
    Brands,

    /// List product categories.
    Categories,

    /// Export the merged catalog as JSON.
    Export {
        /// Output file path. If omitted, writes to stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Start the HTTP server.
    ///
    /// Binds to `[server].bind`; a `PORT` environment variable replaces
    /// the port.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_tracing("linkkora=info,linkkora_core=info")?;

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Sources => {
            sources::list_sources(&cfg).await?;
        }
        Commands::Search {
            query,
            brand,
            category,
            min_price,
            max_price,
            json,
        } => {
            let query = SearchQuery {
                keyword: query,
                brand,
                category,
                min_price: price_arg("--min-price", min_price)?,
                max_price: price_arg("--max-price", max_price)?,
            };
            search::run_search(&cfg, &query, json).await?;
        }
        Commands::Brands => {
            search::run_brands(&cfg).await?;
        }
        Commands::Categories => {
            search::run_categories(&cfg).await?;
        }
        Commands::Export { output } => {
            export::run_export(&cfg, output.as_deref()).await?;
        }
        Commands::Serve => {
            let bind = cfg.bind_with_port(std::env::var("PORT").ok().as_deref())?;
            let repo = catalog::open(&cfg).await?;
            let state = server::AppState {
                catalog: Arc::new(repo),
                engine: SearchEngine::new(cfg.search.order),
            };
            server::run_server(state, &bind).await?;
        }
    }

    Ok(())
}

/// Command-line price bounds are typed by a person, so a bad one is an
/// error rather than a silently dropped filter.
fn price_arg(flag: &str, raw: Option<String>) -> anyhow::Result<Option<f64>> {
    raw.map(|r| parse_price(&r).map_err(|e| anyhow::anyhow!("{}: {}", flag, e)))
        .transpose()
}
