//! Row-level cleaning of raw datastore records.
//!
//! Cleaning only ever drops rows: a record survives when its region, price
//! and month are all present and usable, and its price clears the floor.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::analyzers::types::MonthRange;
use crate::parser::RawRecord;

pub const DEFAULT_PRICE_FLOOR: f64 = 100_000.0;

/// Field names and thresholds applied while cleaning.
#[derive(Debug, Clone)]
pub struct CleanConfig {
    pub region_field: String,
    pub price_field: String,
    pub month_field: String,
    /// Rows priced at or below this value are discarded as implausible.
    pub price_floor: f64,
}

impl Default for CleanConfig {
    fn default() -> Self {
        Self {
            region_field: "town".to_string(),
            price_field: "resale_price".to_string(),
            month_field: "month".to_string(),
            price_floor: DEFAULT_PRICE_FLOOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRow {
    pub region: String,
    pub price: f64,
    pub month: NaiveDate,
}

/// Why rows were dropped, counted per cleaning pass.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CleanStats {
    pub total: usize,
    pub missing_region: usize,
    pub missing_price: usize,
    pub missing_month: usize,
    pub below_floor: usize,
    pub kept: usize,
}

impl CleanStats {
    pub fn dropped(&self) -> usize {
        self.total - self.kept
    }
}

/// Coerces a JSON value to a price. Non-numeric values count as missing.
pub fn coerce_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    price.is_finite().then_some(price)
}

/// Parses `YYYY-MM` (as the first of the month) or `YYYY-MM-DD`.
pub fn parse_month(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d"))
        .ok()
}

fn region_of(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Filters `records` down to rows fit for aggregation, in input order.
pub fn clean(records: &[RawRecord], config: &CleanConfig) -> (Vec<CleanedRow>, CleanStats) {
    let mut stats = CleanStats {
        total: records.len(),
        ..Default::default()
    };
    let mut rows = Vec::with_capacity(records.len());

    for record in records {
        let region = record.get(&config.region_field).and_then(region_of);
        let price = record.get(&config.price_field).and_then(coerce_price);
        let month = record.get(&config.month_field).and_then(parse_month);

        if region.is_none() {
            stats.missing_region += 1;
        }
        if price.is_none() {
            stats.missing_price += 1;
        }
        if month.is_none() {
            stats.missing_month += 1;
        }

        let (Some(region), Some(price), Some(month)) = (region, price, month) else {
            continue;
        };

        if price <= config.price_floor {
            stats.below_floor += 1;
            continue;
        }

        rows.push(CleanedRow { region, price, month });
    }

    stats.kept = rows.len();

    if stats.total > 0 && stats.kept == 0 {
        warn!(total = stats.total, "No records survived cleaning");
    }
    debug!(?stats, "Clean pass breakdown");
    info!(kept = stats.kept, dropped = stats.dropped(), "Cleaned records");

    (rows, stats)
}

/// Earliest and latest month among `rows`, or `None` when empty.
pub fn month_range(rows: &[CleanedRow]) -> Option<MonthRange> {
    let earliest = rows.iter().map(|r| r.month).min()?;
    let latest = rows.iter().map(|r| r.month).max()?;
    Some(MonthRange { earliest, latest })
}
