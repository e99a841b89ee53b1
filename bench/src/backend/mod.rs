//! Storage backends and the common `EmbeddingBackend` trait.
//!
//! Two implementations are provided:
//! - [`sqlite::SqliteBackend`] — embedded single-file database, vectors as BLOBs
//! - [`postgres::PostgresBackend`] — database server, vectors as JSONB

pub mod postgres;
pub mod sqlite;

use anyhow::{Result, bail};
use emb_core::Embedding;

/// Table used when none is configured.
pub const DEFAULT_TABLE: &str = "embeddings";

/// Trait implemented by each storage engine under test.
///
/// Every method is one blocking round trip to the engine. Inserts are
/// committed individually; nothing is batched.
pub trait EmbeddingBackend {
    /// Human-readable name for logs and reports.
    fn name(&self) -> &'static str;

    /// Drop the embeddings table if present and create it empty.
    fn reset_table(&mut self) -> Result<()>;

    /// Insert one record and commit it.
    fn insert(&mut self, embedding: &Embedding) -> Result<()>;

    /// Select one record by key and decode its vector.
    fn fetch(&mut self, key: &str) -> Result<Option<Vec<f32>>>;

    /// Number of rows currently stored.
    fn count(&mut self) -> Result<u64>;

    /// On-disk size of the stored data in bytes, if the engine can report it.
    fn storage_bytes(&mut self) -> Result<Option<u64>>;
}

/// Reject anything but a plain SQL identifier, since table names are
/// interpolated into DDL.
pub fn validate_table_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !valid {
        bail!("invalid table name {name:?}: expected [A-Za-z_][A-Za-z0-9_]*");
    }
    Ok(())
}
