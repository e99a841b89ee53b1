//! Embedding Storage Benchmark
//!
//! Measures how long it takes to write and read back fixed-dimension vectors
//! keyed by string ids, and how much disk they occupy, as the record count
//! grows. Two backends are compared:
//! - **PostgreSQL**: vectors as JSON arrays in a `JSONB` column
//! - **SQLite**: vectors as bincode-encoded BLOBs in a single-file database
//!
//! Every insert is its own committed statement and every read is a single-row
//! select by key, so the numbers reflect per-record round trips.
//!
//! Run the benchmark: `cargo run --release -p embedding-bench -- --backend all`
//! Run tests: `cargo test`

pub mod backend;
pub mod chart;
pub mod config;
pub mod report;
pub mod sweep;
