//! SQLite backend: vectors stored as bincode BLOBs in a single-file database.

use super::{DEFAULT_TABLE, EmbeddingBackend, validate_table_name};
use anyhow::{Context, Result};
use emb_core::{BinaryCodec, Embedding, VectorCodec};
use rusqlite::{Connection, OptionalExtension, params};
use std::fs;
use std::path::Path;

pub struct SqliteBackend {
    conn: Connection,
    table: String,
    codec: BinaryCodec,
}

impl SqliteBackend {
    /// Open (or create) the database file at `path`.
    ///
    /// With `fresh` set, an existing file is removed first so the size
    /// measurements start from an empty database.
    pub fn open(path: impl AsRef<Path>, table: &str, fresh: bool) -> Result<Self> {
        let path = path.as_ref();
        if fresh && path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("failed to remove {}", path.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open SQLite database {}", path.display()))?;
        Self::with_connection(conn, table)
    }

    /// In-memory database, mostly for tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory SQLite")?;
        Self::with_connection(conn, DEFAULT_TABLE)
    }

    fn with_connection(conn: Connection, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        configure_connection(&conn)?;
        Ok(Self {
            conn,
            table: table.to_string(),
            codec: BinaryCodec,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Keep the rollback journal so the main file holds everything that was
/// committed, and reclaim pages when the table is dropped.
pub fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = DELETE;
         PRAGMA auto_vacuum = FULL;",
    )?;
    Ok(())
}

impl EmbeddingBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn reset_table(&mut self) -> Result<()> {
        self.conn
            .execute_batch(&format!(
                "DROP TABLE IF EXISTS {table};
                 CREATE TABLE {table} (
                     key    TEXT PRIMARY KEY,
                     vector BLOB NOT NULL
                 );",
                table = self.table
            ))
            .with_context(|| format!("failed to recreate table {}", self.table))?;
        Ok(())
    }

    fn insert(&mut self, embedding: &Embedding) -> Result<()> {
        let blob = self.codec.encode(&embedding.vector)?;
        let mut stmt = self.conn.prepare_cached(&format!(
            "INSERT INTO {} (key, vector) VALUES (?1, ?2)",
            self.table
        ))?;
        stmt.execute(params![embedding.key, blob])
            .with_context(|| format!("failed to insert key {}", embedding.key))?;
        Ok(())
    }

    fn fetch(&mut self, key: &str) -> Result<Option<Vec<f32>>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("SELECT vector FROM {} WHERE key = ?1", self.table))?;
        let blob: Option<Vec<u8>> = stmt
            .query_row(params![key], |row| row.get(0))
            .optional()
            .with_context(|| format!("failed to select key {key}"))?;

        match blob {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    fn count(&mut self) -> Result<u64> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", self.table), [], |r| {
                r.get(0)
            })?;
        Ok(n as u64)
    }

    fn storage_bytes(&mut self) -> Result<Option<u64>> {
        let page_count: i64 = self
            .conn
            .query_row("PRAGMA page_count", [], |r| r.get(0))?;
        let page_size: i64 = self.conn.query_row("PRAGMA page_size", [], |r| r.get(0))?;
        Ok(Some((page_count * page_size) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emb_core::generate_embeddings;

    #[test]
    fn insert_then_fetch_returns_same_vector() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.reset_table().unwrap();

        let records = generate_embeddings(10, 32, 11);
        for record in &records {
            backend.insert(record).unwrap();
        }
        assert_eq!(backend.count().unwrap(), 10);

        for record in &records {
            let fetched = backend.fetch(&record.key).unwrap();
            assert_eq!(fetched.as_ref(), Some(&record.vector));
        }
    }

    #[test]
    fn fetch_missing_key_is_none() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.reset_table().unwrap();
        assert_eq!(backend.fetch("42").unwrap(), None);
    }

    #[test]
    fn duplicate_key_is_an_error() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.reset_table().unwrap();
        let record = Embedding::new("0", vec![0.5; 4]);
        backend.insert(&record).unwrap();
        assert!(backend.insert(&record).is_err());
    }

    #[test]
    fn reset_table_discards_rows() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        backend.reset_table().unwrap();
        backend.insert(&Embedding::new("0", vec![1.0])).unwrap();
        backend.reset_table().unwrap();
        assert_eq!(backend.count().unwrap(), 0);
    }

    #[test]
    fn fetch_before_reset_fails() {
        let mut backend = SqliteBackend::open_in_memory().unwrap();
        assert!(backend.fetch("0").is_err());
    }
}
