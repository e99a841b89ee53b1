//! SVG charts of a finished run: write time, read time and storage size
//! against record count, one series per backend.

use crate::report::SweepResult;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

pub const WRITE_CHART: &str = "write_time.svg";
pub const READ_CHART: &str = "read_time.svg";
pub const STORAGE_CHART: &str = "storage_size.svg";

const SIZE: (u32, u32) = (960, 600);
const COLORS: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, CYAN];

fn color(idx: usize) -> RGBColor {
    COLORS[idx % COLORS.len()]
}

/// Render all three charts into `out_dir` and return the files written.
pub fn render_charts(out_dir: &Path, results: &[SweepResult]) -> Result<Vec<PathBuf>> {
    let write_path = out_dir.join(WRITE_CHART);
    write_time_chart(&write_path, results)?;

    let read_path = out_dir.join(READ_CHART);
    read_time_chart(&read_path, results)?;

    let storage_path = out_dir.join(STORAGE_CHART);
    storage_chart(&storage_path, results)?;

    Ok(vec![write_path, read_path, storage_path])
}

fn points(counts: Vec<usize>, values: Vec<f64>) -> Vec<(f64, f64)> {
    counts
        .into_iter()
        .map(|c| c as f64)
        .zip(values)
        .collect()
}

/// Scatter plus line: seconds to insert every record.
pub fn write_time_chart(path: &Path, results: &[SweepResult]) -> Result<()> {
    let series: Vec<(&str, Vec<(f64, f64)>)> = results
        .iter()
        .map(|r| (r.backend.as_str(), points(r.counts(), r.write_secs())))
        .collect();
    line_chart(path, "Write time vs. record count", &series, true)
        .with_context(|| format!("failed to render {}", path.display()))
}

/// Line: seconds to select every record by key.
pub fn read_time_chart(path: &Path, results: &[SweepResult]) -> Result<()> {
    let series: Vec<(&str, Vec<(f64, f64)>)> = results
        .iter()
        .map(|r| (r.backend.as_str(), points(r.counts(), r.read_secs())))
        .collect();
    line_chart(path, "Read time vs. record count", &series, false)
        .with_context(|| format!("failed to render {}", path.display()))
}

fn upper_bound(max: f64) -> f64 {
    if max > 0.0 { max * 1.1 } else { 1.0 }
}

fn line_chart(
    path: &Path,
    title: &str,
    series: &[(&str, Vec<(f64, f64)>)],
    with_points: bool,
) -> Result<()> {
    let all = series.iter().flat_map(|(_, pts)| pts.iter());
    let (x_max, y_max) = all.fold((0.0f64, 0.0f64), |(xm, ym), &(x, y)| (xm.max(x), ym.max(y)));

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(72)
        .build_cartesian_2d(0.0..upper_bound(x_max), 0.0..upper_bound(y_max))?;

    chart
        .configure_mesh()
        .x_desc("records")
        .y_desc("seconds")
        .x_label_formatter(&|x| format!("{x:.0}"))
        .draw()?;

    for (idx, (name, pts)) in series.iter().enumerate() {
        let c = color(idx);
        chart
            .draw_series(LineSeries::new(pts.iter().copied(), c.stroke_width(2)))?
            .label(*name)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], c.stroke_width(2)));
        if with_points {
            chart.draw_series(pts.iter().map(|&p| Circle::new(p, 4, c.filled())))?;
        }
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

/// Grouped bars: storage size in MiB for each record count. Backends that
/// cannot report a size are left out.
pub fn storage_chart(path: &Path, results: &[SweepResult]) -> Result<()> {
    render_storage_chart(path, results)
        .with_context(|| format!("failed to render {}", path.display()))
}

fn render_storage_chart(path: &Path, results: &[SweepResult]) -> Result<()> {
    let sized: Vec<&SweepResult> = results
        .iter()
        .filter(|r| r.samples.iter().any(|s| s.storage_bytes.is_some()))
        .collect();

    let counts = sized
        .iter()
        .map(|r| r.counts())
        .max_by_key(Vec::len)
        .unwrap_or_default();
    let slots = counts.len().max(1);

    let mib = |b: u64| b as f64 / (1024.0 * 1024.0);
    let y_max = sized
        .iter()
        .flat_map(|r| r.storage_bytes())
        .flatten()
        .map(mib)
        .fold(0.0f64, f64::max);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Storage size vs. record count", ("sans-serif", 24))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(72)
        .build_cartesian_2d(-0.5..(slots as f64 - 0.5), 0.0..upper_bound(y_max))?;

    let label_for = |x: &f64| {
        let idx = x.round();
        if (x - idx).abs() > 1e-6 || idx < 0.0 {
            return String::new();
        }
        counts
            .get(idx as usize)
            .map(|c| c.to_string())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(slots)
        .x_label_formatter(&label_for)
        .x_desc("records")
        .y_desc("MiB")
        .draw()?;

    let bar_width = 0.8 / sized.len().max(1) as f64;
    for (idx, result) in sized.iter().enumerate() {
        let c = color(idx);
        let bars = result
            .samples
            .iter()
            .enumerate()
            .filter_map(|(slot, s)| s.storage_bytes.map(|b| (slot, mib(b))))
            .map(|(slot, size)| {
                let x0 = slot as f64 - 0.4 + idx as f64 * bar_width;
                Rectangle::new([(x0, 0.0), (x0 + bar_width, size)], c.filled())
            });
        chart
            .draw_series(bars)?
            .label(result.backend.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], c.filled()));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
