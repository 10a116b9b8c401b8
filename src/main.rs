//! CLI entry point for the HDB resale price chart.
//!
//! Fetches resale transactions from data.gov.sg, computes the median resale
//! price per town and writes a horizontal bar chart under `chart/`. Every
//! flag defaults to the stock behaviour, so running without arguments
//! produces the standard chart.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use hdb_resale_chart::{
    clean::{CleanConfig, DEFAULT_PRICE_FLOOR},
    fetch::{
        BasicClient, DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_RESOURCE_ID, DatastoreQuery,
        HttpClient, auth::ApiKey,
    },
    pipeline::{PipelineConfig, run},
    render::{DEFAULT_TITLE, OutputFormat, RenderConfig},
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "hdb_resale_chart")]
#[command(about = "Chart median HDB resale prices by town", long_about = None)]
struct Cli {
    /// Chart format to produce
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Directory the chart is written to (created if absent)
    #[arg(short = 'd', long, default_value = "chart")]
    chart_dir: PathBuf,

    /// datastore_search endpoint
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Dataset served by the endpoint
    #[arg(long, default_value = DEFAULT_RESOURCE_ID)]
    resource_id: String,

    /// Records requested per page
    #[arg(short = 'p', long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Pause between page requests, in milliseconds
    #[arg(long, default_value_t = 0)]
    page_delay_ms: u64,

    /// Optional data.gov.sg API key, sent as `x-api-key`
    #[arg(long)]
    api_key: Option<String>,

    /// Rows priced at or below this are dropped
    #[arg(long, default_value_t = DEFAULT_PRICE_FLOOR)]
    price_floor: f64,

    /// Record field holding the region name
    #[arg(long, default_value = "town")]
    region_field: String,

    /// Record field holding the resale price
    #[arg(long, default_value = "resale_price")]
    price_field: String,

    /// Record field holding the transaction month
    #[arg(long, default_value = "month")]
    month_field: String,

    /// Chart title
    #[arg(long, default_value = DEFAULT_TITLE)]
    title: String,

    /// PNG width in pixels
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Chart height in pixels
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Also write the region medians to this CSV file
    #[arg(long)]
    export_csv: Option<PathBuf>,
}

impl Cli {
    fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            query: DatastoreQuery {
                base_url: self.base_url.clone(),
                resource_id: self.resource_id.clone(),
                page_size: self.page_size,
                page_delay: Duration::from_millis(self.page_delay_ms),
            },
            clean: CleanConfig {
                region_field: self.region_field.clone(),
                price_field: self.price_field.clone(),
                month_field: self.month_field.clone(),
                price_floor: self.price_floor,
            },
            render: RenderConfig {
                format: self.format,
                chart_dir: self.chart_dir.clone(),
                title: self.title.clone(),
                width: self.width,
                height: self.height,
            },
            export_csv: self.export_csv.clone(),
        }
    }
}

/// Filter read from `var`, falling back to `default` when it is unset.
fn env_filter(var: &str, default: LevelFilter) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(default.into())
        .with_env_var(var)
        .from_env_lossy()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/hdb_resale_chart.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("hdb_resale_chart.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(env_filter("RUST_LOG", LevelFilter::INFO));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(env_filter("RUST_LOG_JSON", LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let config = cli.pipeline_config();

    let client = BasicClient::new()?;
    match cli.api_key {
        Some(key) => execute(&ApiKey::data_gov_sg(client, key), &config),
        None => execute(&client, &config),
    }
}

fn execute<C: HttpClient>(client: &C, config: &PipelineConfig) -> Result<()> {
    let report = run(client, config, Local::now().date_naive())?;

    info!(
        fetched = report.summary.fetched,
        kept = report.summary.clean_stats.kept,
        regions = report.summary.series.len(),
        path = %report.chart_path.display(),
        "Chart saved"
    );
    Ok(())
}
