//! Chart rendering for the aggregated series.
//!
//! Two output formats share one entry point: an interactive HTML page with
//! a fixed file name, and a static PNG stamped with the run date.

pub mod html;
pub mod png;

use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;
use std::path::PathBuf;
use tracing::info;

use crate::analyzers::types::{AggregatedSeries, MonthRange};
use crate::output::write_atomic;

pub const PRICE_AXIS_LABEL: &str = "Median Resale Price (SGD)";
pub const REGION_AXIS_LABEL: &str = "Town";
pub const DEFAULT_TITLE: &str = "Median HDB Resale Price by Town";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Interactive page, `resale_chart.html`
    #[default]
    Html,
    /// Static image, `median_resale_prices_<date>.png`
    Png,
}

#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub format: OutputFormat,
    pub chart_dir: PathBuf,
    pub title: String,
    /// Image width in pixels. The HTML page is responsive and ignores it.
    pub width: u32,
    pub height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Html,
            chart_dir: PathBuf::from("chart"),
            title: DEFAULT_TITLE.to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Output path for a chart rendered on `today`.
pub fn chart_path(config: &RenderConfig, today: NaiveDate) -> PathBuf {
    let file_name = match config.format {
        OutputFormat::Html => "resale_chart.html".to_string(),
        OutputFormat::Png => format!("median_resale_prices_{}.png", today.format("%Y-%m-%d")),
    };
    config.chart_dir.join(file_name)
}

/// Renders the series in the configured format and writes it under the
/// chart directory. Returns the path written.
pub fn render(
    series: &AggregatedSeries,
    range: &MonthRange,
    config: &RenderConfig,
    today: NaiveDate,
) -> Result<PathBuf> {
    if series.is_empty() {
        anyhow::bail!("nothing to chart: aggregated series is empty");
    }

    let bytes = match config.format {
        OutputFormat::Html => html::render_html(series, range, config)?,
        OutputFormat::Png => png::render_png(series, range, config)?,
    };

    let path = chart_path(config, today);
    write_atomic(&path, &bytes)?;

    info!(path = %path.display(), format = ?config.format, "Chart saved");
    Ok(path)
}
