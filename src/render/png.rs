//! Static chart: a raster bar chart drawn with plotters and encoded as PNG.

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};
use plotters::prelude::*;
use std::io::Cursor;

use super::{PRICE_AXIS_LABEL, REGION_AXIS_LABEL, RenderConfig};
use crate::analyzers::types::{AggregatedSeries, MonthRange};

const BAR_COLOR: RGBColor = RGBColor(0x1f, 0x77, 0xb4);

/// Draws the series into an RGB pixel buffer of `config.width` x `config.height`.
pub fn draw(
    series: &AggregatedSeries,
    range: &MonthRange,
    config: &RenderConfig,
) -> Result<Vec<u8>> {
    let (width, height) = (config.width, config.height);
    let mut buf = vec![0u8; width as usize * height as usize * 3];
    let rows = series.len();
    let x_max = series.max_median().unwrap_or(1.0).max(1.0) * 1.05;

    {
        let root = BitMapBackend::with_buffer(&mut buf, (width, height)).into_drawing_area();
        root.fill(&WHITE)?;

        let (title_area, plot_area) = root.split_vertically(70);
        title_area.draw(&Text::new(
            config.title.clone(),
            (20, 12),
            ("sans-serif", 26).into_font(),
        ))?;
        title_area.draw(&Text::new(
            range.subtitle(),
            (20, 44),
            ("sans-serif", 16).into_font().color(&BLACK.mix(0.6)),
        ))?;

        let mut chart = ChartBuilder::on(&plot_area)
            .margin(15)
            .x_label_area_size(45)
            .y_label_area_size(170)
            .build_cartesian_2d(0f64..x_max, (0usize..rows).into_segmented())?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .x_desc(PRICE_AXIS_LABEL)
            .y_desc(REGION_AXIS_LABEL)
            .y_labels(rows.max(1))
            .x_label_formatter(&|v| format!("{:.0}k", v / 1000.0))
            .y_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => series
                    .0
                    .get(*i)
                    .map(|r| r.region.clone())
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(series.iter().enumerate().map(|(i, r)| {
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(i)),
                    (r.median_price, SegmentValue::Exact(i + 1)),
                ],
                BAR_COLOR.filled(),
            );
            bar.set_margin(2, 2, 0, 0);
            bar
        }))?;

        root.present()?;
    }

    Ok(buf)
}

/// Encodes a packed RGB pixel buffer as PNG.
pub fn encode_png(pixels: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>> {
    let img = RgbImage::from_raw(width, height, pixels)
        .context("Pixel buffer does not match chart dimensions")?;

    let mut png = Cursor::new(Vec::new());
    img.write_to(&mut png, ImageFormat::Png)
        .context("Failed to encode chart as PNG")?;
    Ok(png.into_inner())
}

/// Renders the chart and encodes it as PNG bytes.
pub fn render_png(
    series: &AggregatedSeries,
    range: &MonthRange,
    config: &RenderConfig,
) -> Result<Vec<u8>> {
    let pixels = draw(series, range, config)?;
    encode_png(pixels, config.width, config.height)
}
