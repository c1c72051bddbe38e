use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use energy_report::cross::CrossTable;
use energy_report::{Pipeline, ReportConfig, parse_size_list};

#[derive(Parser, Debug)]
#[command(
    name = "energy-report",
    about = "Generate per-size summaries and cross-record comparisons"
)]
struct Args {
    /// Comma-separated record sizes to process (e.g. 100,500,1000).
    /// If omitted, every digit-named folder under the results directory is used.
    #[arg(short, long)]
    records: Option<String>,

    /// Root directory holding one folder per record size.
    #[arg(long)]
    results_dir: Option<PathBuf>,

    /// Optional JSON file overriding report settings.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_tracing();

    let mut config = match &args.config {
        Some(path) => ReportConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ReportConfig::default(),
    };
    if let Some(dir) = args.results_dir {
        config = config.with_results_dir(dir);
    }
    info!(?config, "starting energy report");

    let sizes = args.records.as_deref().map(parse_size_list);
    let report = Pipeline::new(config)
        .run(sizes.as_deref())
        .context("generating energy comparison reports")?;

    for output in report.full.iter().chain(report.trimmed.iter()) {
        print_table(&output.table);
        println!("    wrote {}", output.path.display());
    }
    if !report.skipped.is_empty() {
        println!("skipped record sizes: {:?}", report.skipped);
    }

    Ok(())
}

fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn print_table(table: &CrossTable) {
    println!("=== {:?} cross-record comparison ===", table.variant);
    let width = table
        .rows
        .iter()
        .map(|row| row.operation.len())
        .max()
        .unwrap_or(0);

    print!("  {:<width$}", "query");
    for size in &table.sizes {
        print!(" | {size:>18}");
    }
    println!();

    for row in &table.rows {
        print!("  {:<width$}", row.operation);
        for cell in &row.cells {
            print!(" | {:>18}", cell.delta);
        }
        println!();
    }
}
