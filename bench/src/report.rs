//! Report module: measurement types, the human-readable summary and JSON export.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Duration;

/// One measurement: a full write pass and read pass over `count` records.
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub count: usize,
    #[serde(serialize_with = "as_secs")]
    pub write: Duration,
    #[serde(serialize_with = "as_secs")]
    pub read: Duration,
    pub storage_bytes: Option<u64>,
}

fn as_secs<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl Sample {
    /// Mean time per insert in microseconds.
    pub fn write_us_per_record(&self) -> f64 {
        per_record_us(self.write, self.count)
    }

    /// Mean time per select in microseconds.
    pub fn read_us_per_record(&self) -> f64 {
        per_record_us(self.read, self.count)
    }

    pub fn inserts_per_sec(&self) -> f64 {
        let secs = self.write.as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }
        self.count as f64 / secs
    }
}

fn per_record_us(d: Duration, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    d.as_secs_f64() * 1e6 / count as f64
}

/// Results from sweeping one backend over the configured counts.
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub backend: String,
    pub dimension: usize,
    pub samples: Vec<Sample>,
}

impl SweepResult {
    pub fn new(backend: &str, dimension: usize) -> Self {
        Self {
            backend: backend.to_string(),
            dimension,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn counts(&self) -> Vec<usize> {
        self.samples.iter().map(|s| s.count).collect()
    }

    pub fn write_secs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.write.as_secs_f64()).collect()
    }

    pub fn read_secs(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.read.as_secs_f64()).collect()
    }

    pub fn storage_bytes(&self) -> Vec<Option<u64>> {
        self.samples.iter().map(|s| s.storage_bytes).collect()
    }
}

/// Render a byte count with a binary unit, e.g. `1.50 MiB`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

fn format_storage(bytes: Option<u64>) -> String {
    bytes.map(format_bytes).unwrap_or_else(|| "n/a".to_string())
}

/// Print a formatted report for each backend, then a side-by-side comparison.
pub fn print_report(results: &[SweepResult]) {
    println!("\n{}", "=".repeat(96));
    println!("  Embedding Storage Benchmark Report");
    println!("{}", "=".repeat(96));

    for result in results {
        println!(
            "\n  Backend: {} | Dimension: {}",
            result.backend, result.dimension
        );
        println!("  {}", "-".repeat(92));
        println!(
            "  {:>10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14}",
            "Records", "Write (s)", "µs/insert", "Inserts/s", "Read (s)", "µs/select", "Storage"
        );
        for s in &result.samples {
            println!(
                "  {:>10} {:>12.3} {:>12.1} {:>12.0} {:>12.3} {:>12.1} {:>14}",
                s.count,
                s.write.as_secs_f64(),
                s.write_us_per_record(),
                s.inserts_per_sec(),
                s.read.as_secs_f64(),
                s.read_us_per_record(),
                format_storage(s.storage_bytes),
            );
        }
    }

    println!("\n{}", "=".repeat(96));

    if results.len() >= 2 {
        println!("\n  Comparison Summary (largest count per backend):");
        println!(
            "  {:12} {:>10} {:>12} {:>12} {:>14}",
            "Backend", "Records", "µs/insert", "µs/select", "Storage"
        );
        println!("  {}", "-".repeat(64));
        for r in results {
            let Some(last) = r.samples.last() else {
                continue;
            };
            println!(
                "  {:12} {:>10} {:>12.1} {:>12.1} {:>14}",
                r.backend,
                last.count,
                last.write_us_per_record(),
                last.read_us_per_record(),
                format_storage(last.storage_bytes),
            );
        }
    }

    println!();
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    results: &'a [SweepResult],
}

/// Write all results as pretty-printed JSON.
pub fn write_json(path: &Path, results: &[SweepResult]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let report = JsonReport {
        generated_at: chrono::Local::now().to_rfc3339(),
        results,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &report)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(count: usize, write_ms: u64, read_ms: u64) -> Sample {
        Sample {
            count,
            write: Duration::from_millis(write_ms),
            read: Duration::from_millis(read_ms),
            storage_bytes: Some(count as u64 * 100),
        }
    }

    #[test]
    fn per_record_rates() {
        let s = sample(1000, 500, 250);
        assert!((s.write_us_per_record() - 500.0).abs() < 1e-9);
        assert!((s.read_us_per_record() - 250.0).abs() < 1e-9);
        assert!((s.inserts_per_sec() - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn zero_count_and_zero_time_do_not_divide_by_zero() {
        let s = sample(0, 0, 0);
        assert_eq!(s.write_us_per_record(), 0.0);
        assert_eq!(s.read_us_per_record(), 0.0);
        assert_eq!(s.inserts_per_sec(), 0.0);
    }

    #[test]
    fn parallel_lists_follow_sample_order() {
        let mut r = SweepResult::new("sqlite", 8);
        r.push(sample(10, 1000, 2000));
        r.push(sample(100, 3000, 4000));
        assert_eq!(r.counts(), vec![10, 100]);
        assert_eq!(r.write_secs(), vec![1.0, 3.0]);
        assert_eq!(r.read_secs(), vec![2.0, 4.0]);
        assert_eq!(r.storage_bytes(), vec![Some(1000), Some(10_000)]);
    }

    #[test]
    fn format_bytes_picks_unit() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KiB");
        assert_eq!(format_bytes(1536 * 1024), "1.50 MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00 GiB");
    }

    #[test]
    fn json_export_contains_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let mut r = SweepResult::new("sqlite", 4);
        r.push(sample(10, 1500, 500));
        write_json(&path, &[r]).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let first = &parsed["results"][0];
        assert_eq!(first["backend"], "sqlite");
        assert_eq!(first["samples"][0]["count"], 10);
        assert_eq!(first["samples"][0]["write"], 1.5);
        assert_eq!(first["samples"][0]["storage_bytes"], 1000);
    }
}
