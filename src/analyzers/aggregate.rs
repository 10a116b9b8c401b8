use crate::analyzers::types::{AggregatedSeries, RegionMedian};
use crate::analyzers::utility::median;
use crate::clean::CleanedRow;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups cleaned rows by region and computes each region's median price.
///
/// Groups are enumerated in region-name order, then stably sorted ascending
/// by median, so regions with equal medians stay in name order. Regions
/// with no rows never appear.
pub fn aggregate(rows: &[CleanedRow]) -> AggregatedSeries {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for row in rows {
        groups.entry(row.region.as_str()).or_default().push(row.price);
    }

    let mut medians: Vec<RegionMedian> = groups
        .into_iter()
        .filter_map(|(region, prices)| {
            Some(RegionMedian {
                region: region.to_string(),
                median_price: median(&prices)?,
                count: prices.len(),
            })
        })
        .collect();

    medians.sort_by(|a, b| a.median_price.total_cmp(&b.median_price));

    debug!(regions = medians.len(), "Aggregated region medians");
    AggregatedSeries(medians)
}
