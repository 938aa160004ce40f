//! Parser CLI - Parses a downloaded source file into normalized records
//!
//! Usage:
//!   cargo run --bin vitibrasil-parser -- --dataset producao --file Producao.csv
//!   cargo run --bin vitibrasil-parser -- --dataset importacao --file ImpVinhos.csv --json

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use vitibrasil_parser::{try_parse_payload, Dataset};

#[derive(Parser, Debug)]
#[command(name = "vitibrasil-parser", about = "Parses a source file into normalized records")]
struct Args {
    /// Dataset key (producao, processamento, comercializacao, importacao, exportacao)
    #[arg(long)]
    dataset: String,

    /// Path to the downloaded source file
    #[arg(long)]
    file: PathBuf,

    /// Print every record as JSON instead of a summary
    #[arg(long, default_value = "false")]
    json: bool,

    /// Number of sample records shown in the summary
    #[arg(long, default_value = "3")]
    limit: usize,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let dataset: Dataset = args.dataset.parse()?;

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let records = try_parse_payload(dataset, &bytes)
        .with_context(|| format!("Failed to parse {}", args.file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    println!("=== Vitibrasil Parser ===");
    println!("Dataset: {} ({})", dataset.key(), dataset.title());
    println!("File: {} ({} bytes)", args.file.display(), bytes.len());
    println!("\nParsed {} records", records.len());

    for (i, record) in records.iter().take(args.limit).enumerate() {
        println!(
            "  [{}] {} | {} | {} {}{}",
            i + 1,
            record.label.as_str(),
            record.ano,
            record.quantidade,
            record.unidade,
            record.tipo.as_deref().map(|t| format!(" | {t}")).unwrap_or_default()
        );
    }
    if records.len() > args.limit {
        println!("  ... and {} more", records.len() - args.limit);
    }

    Ok(())
}
