//! The fetch → clean → aggregate → render run.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::{AggregatedSeries, MonthRange};
use crate::clean::{CleanConfig, CleanStats, clean, month_range};
use crate::fetch::{DatastoreQuery, HttpClient, fetch_all};
use crate::output::{export_csv, log_summary};
use crate::render::{RenderConfig, render};

/// Everything one run needs. `Default` reproduces the stock HDB chart.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub query: DatastoreQuery,
    pub clean: CleanConfig,
    pub render: RenderConfig,
    /// Also write the aggregated series as CSV to this path.
    pub export_csv: Option<PathBuf>,
}

/// Data side of a run: what was fetched, kept and aggregated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub fetched: usize,
    pub clean_stats: CleanStats,
    pub range: MonthRange,
    pub series: AggregatedSeries,
}

/// What a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summary: Summary,
    pub chart_path: PathBuf,
}

/// Fetches, cleans and aggregates without touching the filesystem.
pub fn compute<C: HttpClient>(client: &C, config: &PipelineConfig) -> Result<Summary> {
    let records = fetch_all(client, &config.query)?;

    let (rows, clean_stats) = clean(&records, &config.clean);
    let range = month_range(&rows).context("No records left after cleaning, nothing to chart")?;

    let series = aggregate(&rows);
    log_summary(&series);

    Ok(Summary {
        fetched: records.len(),
        clean_stats,
        range,
        series,
    })
}

/// Runs the whole pipeline once and writes the chart for `today`.
#[tracing::instrument(skip_all, fields(format = ?config.render.format))]
pub fn run<C: HttpClient>(
    client: &C,
    config: &PipelineConfig,
    today: NaiveDate,
) -> Result<RunReport> {
    let summary = compute(client, config)?;
    info!(
        regions = summary.series.len(),
        subtitle = %summary.range.subtitle(),
        "Computed region medians"
    );

    let chart_path = render(&summary.series, &summary.range, &config.render, today)?;

    if let Some(path) = &config.export_csv {
        export_csv(path, &summary.series)?;
    }

    Ok(RunReport { summary, chart_path })
}
