//! Collector CLI - Refreshes the cached snapshots of the portal datasets
//!
//! Usage:
//!   # All datasets:
//!   cargo run --bin vitibrasil-collector
//!
//!   # One dataset, without touching the cache:
//!   cargo run --bin vitibrasil-collector -- --dataset producao --dry-run

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use vitibrasil_collector::{CacheStore, Config, DataService, GetOptions, HttpFetcher, Tier};
use vitibrasil_parser::Dataset;

#[derive(Parser, Debug)]
#[command(
    name = "vitibrasil-collector",
    about = "Collects viticulture datasets into the local cache"
)]
struct Args {
    /// Dataset key (default: every dataset)
    #[arg(long)]
    dataset: Option<String>,

    /// Do not fall back to cached snapshots when the source fails
    #[arg(long, default_value = "false")]
    no_cache: bool,

    /// Dry run - fetch and parse but don't write the cache
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_env();

    println!("=== Vitibrasil Collector ===");
    println!("Source: {}", config.base_url);
    println!("Cache: {}", config.cache_dir.display());

    let datasets: Vec<Dataset> = match &args.dataset {
        Some(key) => vec![key.parse::<Dataset>()?],
        None => Dataset::ALL.to_vec(),
    };

    let cache = CacheStore::init(&config.cache_dir)
        .await
        .context("Failed to initialize cache directory")?;
    let fetcher = HttpFetcher::from_config(&config).context("Failed to build HTTP client")?;
    let service = DataService::new(Arc::new(fetcher), cache);

    let opts = GetOptions {
        use_cache: !args.no_cache,
        write_cache: !args.dry_run,
    };

    let mut live = 0;
    let mut degraded = 0;

    for dataset in datasets {
        println!("\n[{}] {}", dataset.key(), dataset.title());
        let served = service.get_data_with(dataset, opts).await;

        match served.tier {
            Tier::Live => {
                live += 1;
                println!("  ✓ {} records from source", served.records.len());
            }
            Tier::Cache | Tier::Fallback => {
                degraded += 1;
                println!(
                    "  ✗ Source unavailable - {} records from {}",
                    served.records.len(),
                    served.tier.as_str()
                );
            }
        }

        if served.tier == Tier::Cache {
            if let Ok(Some(snapshot)) = service.cache().load_snapshot(dataset).await {
                println!("  Snapshot captured at: {}", snapshot.captured_at.to_rfc3339());
            }
        }
    }

    println!("\n=== Collection Summary ===");
    println!("Live: {}", live);
    println!("Degraded: {}", degraded);
    if args.dry_run {
        println!("Dry run - cache not written");
    }

    Ok(())
}
