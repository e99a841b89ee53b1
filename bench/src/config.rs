//! Command-line and environment configuration.
//!
//! Every flag can also come from an `EMBENCH_*` variable; `main` loads a
//! `.env` file first so those variables may live there.

use crate::backend::{DEFAULT_TABLE, postgres::DEFAULT_POSTGRES_URL, validate_table_name};
use crate::sweep::SweepParams;
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

pub const DEFAULT_COUNTS: &str = "100,500,1000,5000,10000";
pub const DEFAULT_DIMENSION: usize = 1536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    Sqlite,
    Postgres,
    All,
}

impl BackendKind {
    pub fn includes_sqlite(self) -> bool {
        matches!(self, BackendKind::Sqlite | BackendKind::All)
    }

    pub fn includes_postgres(self) -> bool {
        matches!(self, BackendKind::Postgres | BackendKind::All)
    }
}

/// Write/read latency and storage size benchmark for embedding vectors.
#[derive(Debug, Parser)]
#[command(name = "embedding-bench", version)]
pub struct Cli {
    /// Storage backend(s) to measure.
    #[arg(long, value_enum, env = "EMBENCH_BACKEND", default_value = "sqlite")]
    pub backend: BackendKind,

    /// Comma-separated record counts, measured in the given order.
    #[arg(long, env = "EMBENCH_COUNTS", default_value = DEFAULT_COUNTS)]
    pub counts: String,

    /// Number of values per vector.
    #[arg(long, env = "EMBENCH_DIMENSION", default_value_t = DEFAULT_DIMENSION)]
    pub dimension: usize,

    /// Base seed for the random vectors.
    #[arg(long, env = "EMBENCH_SEED", default_value_t = 42)]
    pub seed: u64,

    /// SQLite database file. Recreated at the start of each run.
    #[arg(long, env = "EMBENCH_SQLITE_PATH", default_value = "embeddings.db")]
    pub sqlite_path: PathBuf,

    /// PostgreSQL connection URL.
    #[arg(long, env = "EMBENCH_POSTGRES_URL", default_value = DEFAULT_POSTGRES_URL)]
    pub postgres_url: String,

    /// Table the embeddings are written to.
    #[arg(long, env = "EMBENCH_TABLE", default_value = DEFAULT_TABLE)]
    pub table: String,

    /// Directory for the JSON results and SVG charts.
    #[arg(long, env = "EMBENCH_OUT_DIR", default_value = "bench-results")]
    pub out_dir: PathBuf,

    /// Compare every vector read back against the one written.
    #[arg(long, env = "EMBENCH_VERIFY")]
    pub verify: bool,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_charts: bool,

    /// Log level for stderr (error, warn, info, debug, trace).
    #[arg(long, env = "EMBENCH_LOG", default_value = "info")]
    pub log_level: String,

    /// Also append log records to this file.
    #[arg(long, env = "EMBENCH_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn level_filter(&self) -> Result<LevelFilter> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid --log-level {:?}", self.log_level))
    }
}

/// Validated run configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub backend: BackendKind,
    pub sweep: SweepParams,
    pub sqlite_path: PathBuf,
    pub postgres_url: String,
    pub table: String,
    pub out_dir: PathBuf,
    pub charts: bool,
}

impl TryFrom<Cli> for BenchConfig {
    type Error = anyhow::Error;

    fn try_from(cli: Cli) -> Result<Self> {
        if cli.dimension == 0 {
            bail!("--dimension must be positive");
        }
        validate_table_name(&cli.table)?;
        let counts = parse_counts(&cli.counts).context("invalid --counts")?;

        Ok(Self {
            backend: cli.backend,
            sweep: SweepParams {
                counts,
                dimension: cli.dimension,
                seed: cli.seed,
                verify: cli.verify,
            },
            sqlite_path: cli.sqlite_path,
            postgres_url: cli.postgres_url,
            table: cli.table,
            out_dir: cli.out_dir,
            charts: !cli.no_charts,
        })
    }
}

/// Parse `"100, 1000,10000"` into counts, keeping their order.
pub fn parse_counts(list: &str) -> Result<Vec<usize>> {
    let mut counts = Vec::new();
    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let count: usize = part
            .replace('_', "")
            .parse()
            .with_context(|| format!("{part:?} is not a record count"))?;
        if count == 0 {
            bail!("record counts must be positive");
        }
        counts.push(count);
    }
    if counts.is_empty() {
        bail!("at least one record count is required");
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_counts_keeps_order_and_trims() {
        assert_eq!(parse_counts("100, 10 ,1_000").unwrap(), vec![100, 10, 1000]);
        assert_eq!(parse_counts("5,").unwrap(), vec![5]);
    }

    #[test]
    fn parse_counts_rejects_bad_input() {
        assert!(parse_counts("").is_err());
        assert!(parse_counts(" , ").is_err());
        assert!(parse_counts("10,abc").is_err());
        assert!(parse_counts("10,0").is_err());
        assert!(parse_counts("-5").is_err());
    }

    #[test]
    fn defaults_produce_a_valid_config() {
        let cli = Cli::try_parse_from(["embedding-bench"]).unwrap();
        let config = BenchConfig::try_from(cli).unwrap();
        assert_eq!(config.backend, BackendKind::Sqlite);
        assert_eq!(config.sweep.counts, vec![100, 500, 1000, 5000, 10000]);
        assert_eq!(config.sweep.dimension, DEFAULT_DIMENSION);
        assert_eq!(config.table, DEFAULT_TABLE);
        assert!(config.charts);
        assert!(!config.sweep.verify);
    }

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "embedding-bench",
            "--backend",
            "all",
            "--counts",
            "10,20",
            "--dimension",
            "8",
            "--table",
            "vec_small",
            "--verify",
            "--no-charts",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.level_filter().unwrap(), LevelFilter::Debug);

        let config = BenchConfig::try_from(cli).unwrap();
        assert!(config.backend.includes_sqlite());
        assert!(config.backend.includes_postgres());
        assert_eq!(config.sweep.counts, vec![10, 20]);
        assert_eq!(config.sweep.dimension, 8);
        assert_eq!(config.table, "vec_small");
        assert!(config.sweep.verify);
        assert!(!config.charts);
    }

    #[test]
    fn invalid_table_or_dimension_is_rejected() {
        let cli = Cli::try_parse_from(["embedding-bench", "--table", "bad name"]).unwrap();
        assert!(BenchConfig::try_from(cli).is_err());

        let cli = Cli::try_parse_from(["embedding-bench", "--dimension", "0"]).unwrap();
        assert!(BenchConfig::try_from(cli).is_err());
    }

    #[test]
    fn bad_log_level_is_reported() {
        let cli = Cli::try_parse_from(["embedding-bench", "--log-level", "loud"]).unwrap();
        assert!(cli.level_filter().is_err());
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(Cli::try_parse_from(["embedding-bench", "--backend", "mysql"]).is_err());
    }
}
