//! Safe Disposal Guide CLI - catalog tooling.
//!
//! # Usage
//!
//! ```bash
//! # Check the bundled catalog
//! sd-cli catalog validate
//!
//! # Check feeds in another directory
//! sd-cli catalog validate --dir ./data
//!
//! # Run the search page's filter from the terminal
//! sd-cli catalog search --category Sharps --hazard critical
//!
//! # List the categories shown in the search dropdown
//! sd-cli catalog categories
//! ```
//!
//! `--dir` falls back to `SITE_CATALOG_DIR`, then to the bundled feeds.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::catalog::{self, CommandError, Search};

#[derive(Parser)]
#[command(name = "sd-cli")]
#[command(author, version, about = "Safe Disposal Guide CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and query the product/resource catalog
    Catalog {
        /// Directory holding products.json and resources.json
        #[arg(short, long, global = true, env = "SITE_CATALOG_DIR")]
        dir: Option<PathBuf>,

        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Load both feeds and report problems
    Validate,
    /// Filter products (or resources) like the site does
    Search {
        /// Free-text query
        #[arg(short, long, default_value = "")]
        query: String,

        /// Exact category, or "all"
        #[arg(short, long, default_value = "all")]
        category: String,

        /// Hazard level (`low`, `medium`, `high`, `critical`), or "all"
        #[arg(long, default_value = "all")]
        hazard: String,

        /// Search the video library instead of products
        #[arg(long)]
        resources: bool,

        /// Print matching records as JSON
        #[arg(long)]
        json: bool,
    },
    /// List distinct product and resource categories
    Categories,
}

fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing (stderr, so stdout stays pipeable)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "safe_disposal_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CommandError> {
    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::Catalog { dir, action } => {
            let loaded = catalog::load(dir.as_deref())?;
            match action {
                CatalogAction::Validate => {
                    let report = catalog::validate(&loaded);
                    report.write_to(&mut out)?;
                    if report.has_errors() {
                        return Err(CommandError::Invalid(report.error_count()));
                    }
                }
                CatalogAction::Search {
                    query,
                    category,
                    hazard,
                    resources,
                    json,
                } => {
                    let search = Search {
                        query: &query,
                        category: &category,
                        hazard: &hazard,
                        resources,
                        json,
                    };
                    catalog::search(&loaded, &search, &mut out)?;
                }
                CatalogAction::Categories => catalog::categories(&loaded, &mut out)?,
            }
        }
    }
    Ok(())
}
