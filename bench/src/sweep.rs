//! Sweep runner: for each record count, recreate the table, time a full
//! write pass and a full read pass, then record the storage size.

use crate::backend::EmbeddingBackend;
use crate::report::{Sample, SweepResult};
use anyhow::{Context, Result, bail, ensure};
use emb_core::{Embedding, generate_embeddings};
use std::time::{Duration, Instant};

/// What to measure for one backend.
#[derive(Debug, Clone)]
pub struct SweepParams {
    /// Record counts, measured in this order.
    pub counts: Vec<usize>,
    pub dimension: usize,
    pub seed: u64,
    /// Compare every fetched vector against the inserted one.
    pub verify: bool,
}

/// Seed used for one count, so each table generation gets distinct data
/// while the whole run stays reproducible.
pub fn seed_for_count(base: u64, count: usize) -> u64 {
    base ^ (count as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Run the whole sweep against `backend`.
pub fn run_sweep(backend: &mut dyn EmbeddingBackend, params: &SweepParams) -> Result<SweepResult> {
    ensure!(params.dimension > 0, "dimension must be positive");

    let mut result = SweepResult::new(backend.name(), params.dimension);
    for &count in &params.counts {
        log::info!("{}: measuring {} records", backend.name(), count);
        let sample = measure_count(backend, params, count)
            .with_context(|| format!("{} sweep failed at {count} records", backend.name()))?;
        log::info!(
            "{}: {} records written in {:.3}s, read in {:.3}s",
            backend.name(),
            count,
            sample.write.as_secs_f64(),
            sample.read.as_secs_f64()
        );
        result.push(sample);
    }
    Ok(result)
}

fn measure_count(
    backend: &mut dyn EmbeddingBackend,
    params: &SweepParams,
    count: usize,
) -> Result<Sample> {
    backend.reset_table()?;

    let records = generate_embeddings(count, params.dimension, seed_for_count(params.seed, count));

    let write = timed_writes(backend, &records)?;
    log::debug!("{}: write phase {:?}", backend.name(), write);

    let read = timed_reads(backend, &records, params)?;
    log::debug!("{}: read phase {:?}", backend.name(), read);

    let storage_bytes = backend.storage_bytes()?;
    if let Some(bytes) = storage_bytes {
        log::debug!("{}: {} bytes on disk", backend.name(), bytes);
    }

    Ok(Sample {
        count,
        write,
        read,
        storage_bytes,
    })
}

/// Insert every record, one committed statement each.
pub fn timed_writes(backend: &mut dyn EmbeddingBackend, records: &[Embedding]) -> Result<Duration> {
    let start = Instant::now();
    for record in records {
        backend.insert(record)?;
    }
    Ok(start.elapsed())
}

/// Select every record by key. A missing key or a vector of the wrong length
/// fails the run.
pub fn timed_reads(
    backend: &mut dyn EmbeddingBackend,
    records: &[Embedding],
    params: &SweepParams,
) -> Result<Duration> {
    let start = Instant::now();
    for record in records {
        let Some(vector) = backend.fetch(&record.key)? else {
            bail!("key {} missing after insert", record.key);
        };
        if vector.len() != params.dimension {
            bail!(
                "key {} read back with dimension {}, expected {}",
                record.key,
                vector.len(),
                params.dimension
            );
        }
        if params.verify && vector != record.vector {
            bail!("key {} read back with different values", record.key);
        }
    }
    Ok(start.elapsed())
}
