//! Interactive chart: a standalone HTML page driving Plotly from its CDN.

use anyhow::Result;
use serde_json::{Value, json};

use super::{PRICE_AXIS_LABEL, REGION_AXIS_LABEL, RenderConfig};
use crate::analyzers::types::{AggregatedSeries, MonthRange};

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Plotly figure (data + layout) for a horizontal bar chart of the series.
pub fn figure(series: &AggregatedSeries, range: &MonthRange, config: &RenderConfig) -> Value {
    let (regions, medians): (Vec<&str>, Vec<f64>) = series.pairs().into_iter().unzip();

    json!({
        "data": [{
            "type": "bar",
            "orientation": "h",
            "x": medians,
            "y": regions,
            "name": "Median resale price",
            "hovertemplate": "%{y}: %{x:,.0f} SGD<extra></extra>",
        }],
        "layout": {
            "title": { "text": format!("{}<br><sup>{}</sup>", config.title, range.subtitle()) },
            "xaxis": { "title": { "text": PRICE_AXIS_LABEL }, "gridcolor": "#ebf0f8" },
            "yaxis": { "title": { "text": REGION_AXIS_LABEL }, "automargin": true },
            "height": config.height,
            "paper_bgcolor": "white",
            "plot_bgcolor": "white",
        },
    })
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Serializes `value` for embedding in a `<script>` body. Every `<` becomes
/// `\u003c`, so no string in the data can open or close a tag.
fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

/// Renders the chart as a complete HTML document.
pub fn render_html(
    series: &AggregatedSeries,
    range: &MonthRange,
    config: &RenderConfig,
) -> Result<Vec<u8>> {
    let fig = figure(series, range, config);
    let data = script_json(&fig["data"])?;
    let layout = script_json(&fig["layout"])?;

    let page = format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>{title}</title>
<script src="{cdn}" charset="utf-8"></script>
</head>
<body>
<div id="chart" style="width:100%;height:{height}px;"></div>
<script type="text/javascript">
Plotly.newPlot("chart", {data}, {layout}, {{"responsive": true}});
</script>
</body>
</html>
"#,
        title = escape_html(&config.title),
        cdn = PLOTLY_CDN,
        height = config.height,
    );

    Ok(page.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::types::RegionMedian;
    use chrono::NaiveDate;

    fn series(regions: &[(&str, f64)]) -> AggregatedSeries {
        AggregatedSeries(
            regions
                .iter()
                .map(|(region, median_price)| RegionMedian {
                    region: region.to_string(),
                    median_price: *median_price,
                    count: 1,
                })
                .collect(),
        )
    }

    fn range() -> MonthRange {
        MonthRange {
            earliest: NaiveDate::from_ymd_opt(2017, 1, 1).unwrap(),
            latest: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        }
    }

    #[test]
    fn test_figure_is_horizontal_bar_in_series_order() {
        let series = series(&[("A", 1.0), ("B", 2.0)]);
        let fig = figure(&series, &range(), &RenderConfig::default());

        assert_eq!(fig["data"][0]["orientation"], "h");
        assert_eq!(fig["data"][0]["y"], json!(["A", "B"]));
        assert_eq!(fig["data"][0]["x"], json!([1.0, 2.0]));
        assert_eq!(fig["layout"]["height"], 800);
        assert_eq!(fig["layout"]["xaxis"]["title"]["text"], PRICE_AXIS_LABEL);
    }

    #[test]
    fn test_title_carries_month_range() {
        let fig = figure(&series(&[("A", 1.0)]), &range(), &RenderConfig::default());
        let title = fig["layout"]["title"]["text"].as_str().unwrap();
        assert!(title.ends_with("<sup>Data from 2017-01 to 2025-06</sup>"));
    }

    #[test]
    fn test_render_html_references_cdn() {
        let series = series(&[("ANG MO KIO", 400000.0)]);
        let page = render_html(&series, &range(), &RenderConfig::default()).unwrap();
        let page = String::from_utf8(page).unwrap();

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains(PLOTLY_CDN));
        assert!(page.contains("ANG MO KIO"));
    }

    fn inline_script(page: &str) -> &str {
        let start = page.find("Plotly.newPlot").unwrap();
        let end = start + page[start..].find("</script>").unwrap();
        &page[start..end]
    }

    #[test]
    fn test_render_html_escapes_markup_in_data() {
        let hostile = ["</script><b>", "<!--<script>", "</SCRIPT>"];
        for name in hostile {
            let series = series(&[(name, 1.0)]);
            let page = render_html(&series, &range(), &RenderConfig::default()).unwrap();
            let page = String::from_utf8(page).unwrap();

            assert_eq!(page.matches("</script>").count(), 2, "name={name}");
            let script = inline_script(&page);
            assert!(!script.contains('<'), "name={name}");
            assert!(script.ends_with(");\n"), "name={name}");
        }
    }

    #[test]
    fn test_script_json_round_trips() {
        let value = json!({"y": ["<!--<script>", "A & B"], "title": "x<br><sup>y</sup>"});
        let escaped = script_json(&value).unwrap();

        assert!(!escaped.contains('<'));
        assert_eq!(serde_json::from_str::<Value>(&escaped).unwrap(), value);
    }
}
