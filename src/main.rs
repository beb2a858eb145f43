//! Command-line interface for fixture-gen
//!
//! # Usage Examples
//!
//! ```bash
//! # One object per line on stdout
//! fixture-gen generate --catalog catalog.yaml --type Order --count 100 --seed 42
//!
//! # Objects 1000..1010 of the same stream, into a file
//! fixture-gen generate -c catalog.yaml -t Order --start-index 1000 -n 10 -o orders.jsonl
//!
//! # Resolved fields of a generic type
//! fixture-gen resolve --catalog catalog.yaml --type 'Page<Customer>'
//!
//! # Check a catalog and its parameters
//! fixture-gen validate --catalog catalog.yaml --config params.yaml
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=fixture_generator=debug`
//! to trace cycle and depth truncations.

use clap::Parser;
use fixture_gen::args::{Cli, Commands};
use fixture_gen::{run_generate, run_resolve, run_validate};

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout carries the generated objects
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { args } => {
            let metrics = run_generate(&args)?;
            tracing::info!(
                "Wrote {} objects ({} diagnostics) in {:?}",
                metrics.objects_written,
                metrics.diagnostics,
                metrics.total_duration
            );
        }
        Commands::Resolve { args } => {
            print!("{}", run_resolve(&args)?);
        }
        Commands::Validate { args } => {
            let summary = run_validate(&args)?;
            println!(
                "Catalog OK: {} types, {} producers, {} types populated",
                summary.types, summary.producers, summary.populated
            );
        }
    }

    Ok(())
}
