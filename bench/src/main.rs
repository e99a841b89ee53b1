//! Benchmark runner: sweeps the configured backends and writes the report,
//! a JSON dump of every sample and the SVG charts.
//!
//! Usage:
//!   cargo run --release -p embedding-bench
//!   cargo run --release -p embedding-bench -- --backend all --counts 100,1000,10000
//!   EMBENCH_POSTGRES_URL=postgres://user:pw@host/db cargo run --release -p embedding-bench -- --backend postgres

use anyhow::{Context, Result};
use clap::Parser;
use embedding_bench::backend::EmbeddingBackend;
use embedding_bench::backend::postgres::PostgresBackend;
use embedding_bench::backend::sqlite::SqliteBackend;
use embedding_bench::chart::render_charts;
use embedding_bench::config::{BenchConfig, Cli};
use embedding_bench::report::{SweepResult, print_report, write_json};
use embedding_bench::sweep::run_sweep;
use std::fs;
use std::process;

const RESULTS_FILE: &str = "results.json";

fn open_backends(config: &BenchConfig) -> Result<Vec<Box<dyn EmbeddingBackend>>> {
    let mut backends: Vec<Box<dyn EmbeddingBackend>> = Vec::new();
    if config.backend.includes_postgres() {
        backends.push(Box::new(PostgresBackend::connect(
            &config.postgres_url,
            &config.table,
        )?));
    }
    if config.backend.includes_sqlite() {
        backends.push(Box::new(SqliteBackend::open(
            &config.sqlite_path,
            &config.table,
            true,
        )?));
    }
    Ok(backends)
}

fn run(config: &BenchConfig) -> Result<Vec<SweepResult>> {
    log::info!(
        "Sweeping counts {:?} at dimension {}",
        config.sweep.counts,
        config.sweep.dimension
    );

    let mut results = Vec::new();
    for mut backend in open_backends(config)? {
        results.push(run_sweep(&mut *backend, &config.sweep)?);
    }

    print_report(&results);

    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed to create {}", config.out_dir.display()))?;

    let json_path = config.out_dir.join(RESULTS_FILE);
    write_json(&json_path, &results)?;
    log::info!("Results written to {}", json_path.display());

    if config.charts {
        for path in render_charts(&config.out_dir, &results)? {
            log::info!("Chart written to {}", path.display());
        }
    }

    Ok(results)
}

fn main() {
    // A missing .env is fine; flags and the real environment still apply.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = cli.level_filter().unwrap_or_else(|e| {
        eprintln!("{e}");
        process::exit(2);
    });
    let log_file = cli.log_file.as_ref().map(|p| p.to_string_lossy().into_owned());
    emb_core::initialize_logger(level, log_file.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {e:#}. Exiting.");
        process::exit(1);
    });

    let config = match BenchConfig::try_from(cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}");
            process::exit(2);
        }
    };

    if let Err(e) = run(&config) {
        log::error!("Benchmark aborted: {e:#}");
        process::exit(1);
    }
}
