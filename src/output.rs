//! Persistence of charts and aggregated series.
//!
//! Files are written atomically: a temp file in the destination directory is
//! filled and then renamed over the target, so an interrupted run never
//! leaves a truncated file behind.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::analyzers::types::AggregatedSeries;

/// Writes `bytes` to `path`, creating the parent directory if absent.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("Failed to move chart into place at {}", path.display()))?;

    debug!(path = %path.display(), bytes = bytes.len(), "File written");
    Ok(())
}

/// Writes the series as CSV with `region,median_price,count` columns.
pub fn export_csv(path: &Path, series: &AggregatedSeries) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(Vec::new());
    for region in series.iter() {
        writer.serialize(region)?;
    }
    let bytes = writer.into_inner().context("Failed to flush CSV buffer")?;

    write_atomic(path, &bytes)?;
    info!(path = %path.display(), regions = series.len(), "Series exported");
    Ok(())
}

/// Logs each region's median at debug level.
pub fn log_summary(series: &AggregatedSeries) {
    for r in series.iter() {
        debug!(region = %r.region, median_price = r.median_price, count = r.count, "Region median");
    }
}
