// Chart regions rendered with plotters onto a solid white backdrop.

use image::RgbImage;
use plotters::prelude::*;

use super::Rasterize;
use crate::errors::DashError;
use crate::types::{ForecastPoint, ProductShare};

pub const NO_FORECAST_DATA: &str = "No forecast data available";
pub const NO_PRODUCT_DATA: &str = "No product data available";

fn chart_error<E: std::fmt::Display>(e: E) -> DashError {
    DashError::Export(format!("chart rendering failed: {}", e))
}

fn render_into<F>(width: u32, height: u32, draw: F) -> Result<RgbImage, DashError>
where
    F: FnOnce(&DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>) -> Result<(), DashError>,
{
    if width == 0 || height == 0 {
        return Err(DashError::Export("region has no rendered size".to_string()));
    }

    let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;
        draw(&root)?;
        root.present().map_err(chart_error)?;
    }

    RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| DashError::Export("raster buffer size mismatch".to_string()))
}

fn draw_placeholder(
    root: &DrawingArea<BitMapBackend<'_>, plotters::coord::Shift>,
    message: &str,
) -> Result<(), DashError> {
    let (width, height) = root.dim_in_pixel();
    let x = (width as i32 / 2) - (message.len() as i32 * 5);
    let y = height as i32 / 2;
    let style = ("sans-serif", 22).into_font().color(&BLACK);
    root.draw(&Text::new(message.to_string(), (x.max(0), y), style))
        .map_err(chart_error)
}

/// Actual vs. predicted sales with the confidence band.
pub struct ForecastChart<'a> {
    pub points: &'a [ForecastPoint],
    pub title: &'a str,
}

impl<'a> ForecastChart<'a> {
    pub fn new(points: &'a [ForecastPoint]) -> Self {
        Self {
            points,
            title: "Sales Forecast",
        }
    }

    fn y_range(&self) -> (f64, f64) {
        let values = self.points.iter().flat_map(|p| {
            [Some(p.predicted), p.actual, p.lower_bound, p.upper_bound]
                .into_iter()
                .flatten()
        });
        let (min, max) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        let pad = ((max - min) * 0.1).max(1.0);
        ((min - pad).max(0.0), max + pad)
    }
}

impl Rasterize for ForecastChart<'_> {
    fn rasterize(&self, width: u32, height: u32) -> Result<RgbImage, DashError> {
        render_into(width, height, |root| {
            if self.points.is_empty() {
                return draw_placeholder(root, NO_FORECAST_DATA);
            }

            let x_max = (self.points.len().max(2) - 1) as f64;
            let (y_min, y_max) = self.y_range();
            let dates: Vec<&str> = self.points.iter().map(|p| p.date.as_str()).collect();

            let mut chart = ChartBuilder::on(root)
                .caption(self.title, ("sans-serif", 26))
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(70)
                .build_cartesian_2d(0f64..x_max, y_min..y_max)
                .map_err(chart_error)?;

            let date_label = |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                dates.get(idx as usize).map(|d| d.to_string()).unwrap_or_default()
            };
            let money_label = |y: &f64| format!("${:.0}", y);
            chart
                .configure_mesh()
                .x_labels(8)
                .x_label_formatter(&date_label)
                .y_label_formatter(&money_label)
                .x_desc("Date")
                .y_desc("Sales ($)")
                .draw()
                .map_err(chart_error)?;

            let upper: Vec<(f64, f64)> = self
                .points
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.upper_bound.map(|v| (i as f64, v)))
                .collect();
            let lower: Vec<(f64, f64)> = self
                .points
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.lower_bound.map(|v| (i as f64, v)))
                .collect();
            if !upper.is_empty() && upper.len() == lower.len() {
                let band: Vec<(f64, f64)> = upper.iter().copied().chain(lower.iter().rev().copied()).collect();
                chart
                    .draw_series(std::iter::once(Polygon::new(band, BLUE.mix(0.12).filled())))
                    .map_err(chart_error)?
                    .label("Confidence interval")
                    .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BLUE.mix(0.12).filled()));
            }

            chart
                .draw_series(LineSeries::new(
                    self.points.iter().enumerate().map(|(i, p)| (i as f64, p.predicted)),
                    BLUE.stroke_width(2),
                ))
                .map_err(chart_error)?
                .label("Predicted")
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

            let actual: Vec<(f64, f64)> = self
                .points
                .iter()
                .enumerate()
                .filter_map(|(i, p)| p.actual.map(|v| (i as f64, v)))
                .collect();
            if !actual.is_empty() {
                chart
                    .draw_series(LineSeries::new(actual, GREEN.stroke_width(2)))
                    .map_err(chart_error)?
                    .label("Actual")
                    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], GREEN.stroke_width(2)));
            }

            chart
                .configure_series_labels()
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()
                .map_err(chart_error)?;
            Ok(())
        })
    }
}

/// Revenue share per product as vertical bars.
pub struct ProductsChart<'a> {
    pub shares: &'a [ProductShare],
    pub title: &'a str,
}

impl<'a> ProductsChart<'a> {
    pub fn new(shares: &'a [ProductShare]) -> Self {
        Self {
            shares,
            title: "Top Products by Revenue Share",
        }
    }
}

impl Rasterize for ProductsChart<'_> {
    fn rasterize(&self, width: u32, height: u32) -> Result<RgbImage, DashError> {
        render_into(width, height, |root| {
            if self.shares.is_empty() {
                return draw_placeholder(root, NO_PRODUCT_DATA);
            }

            let n = self.shares.len();
            let y_max = self.shares.iter().map(|s| s.percent).fold(0.0, f64::max).max(1.0) * 1.15;
            let names: Vec<&str> = self.shares.iter().map(|s| s.name.as_str()).collect();

            let mut chart = ChartBuilder::on(root)
                .caption(self.title, ("sans-serif", 26))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(60)
                .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
                .map_err(chart_error)?;

            let name_label = |x: &f64| {
                let idx = x.round();
                if (x - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                names.get(idx as usize).map(|n| n.to_string()).unwrap_or_default()
            };
            let percent_label = |y: &f64| format!("{:.0}%", y);
            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(n + 1)
                .x_label_formatter(&name_label)
                .y_label_formatter(&percent_label)
                .y_desc("Share of revenue (%)")
                .draw()
                .map_err(chart_error)?;

            chart
                .draw_series(self.shares.iter().enumerate().map(|(i, share)| {
                    let x = i as f64;
                    Rectangle::new([(x - 0.35, 0.0), (x + 0.35, share.percent)], Palette99::pick(i).filled())
                }))
                .map_err(chart_error)?;
            Ok(())
        })
    }
}
