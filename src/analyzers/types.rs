//! Data types produced by the aggregation stage.

use chrono::NaiveDate;
use serde::Serialize;

/// Median resale price of one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionMedian {
    pub region: String,
    pub median_price: f64,
    /// Number of cleaned rows behind the median.
    pub count: usize,
}

/// Per-region medians, sorted ascending by median price.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregatedSeries(pub Vec<RegionMedian>);

impl AggregatedSeries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RegionMedian> {
        self.0.iter()
    }

    /// `(region, median)` pairs in series order.
    pub fn pairs(&self) -> Vec<(&str, f64)> {
        self.0
            .iter()
            .map(|r| (r.region.as_str(), r.median_price))
            .collect()
    }

    pub fn max_median(&self) -> Option<f64> {
        self.0.iter().map(|r| r.median_price).reduce(f64::max)
    }
}

/// Earliest and latest transaction month in the cleaned data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

impl MonthRange {
    /// Chart subtitle, e.g. `Data from 2017-01 to 2025-06`.
    pub fn subtitle(&self) -> String {
        format!(
            "Data from {} to {}",
            self.earliest.format("%Y-%m"),
            self.latest.format("%Y-%m")
        )
    }
}
