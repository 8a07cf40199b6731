use std::fmt::Write as _;
use std::path::Path;

use crate::errors::DashError;
use crate::types::{ForecastPoint, ProductDetail};

pub const PRODUCTS_HEADER: &str = "Rank,Name,Category,Revenue,Quantity,Contribution(%)";

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Ranked product table: 1-based rank, quoted name/category, two-decimal
/// revenue and contribution.
pub fn products_csv(details: &[ProductDetail]) -> String {
    let mut out = String::with_capacity(64 * (details.len() + 1));
    out.push_str(PRODUCTS_HEADER);
    out.push('\n');
    for (idx, product) in details.iter().enumerate() {
        let _ = writeln!(
            out,
            "{},{},{},{:.2},{},{:.2}",
            idx + 1,
            quoted(&product.name),
            quoted(&product.category),
            product.revenue,
            product.quantity,
            product.percentage
        );
    }
    out
}

pub fn export_products_csv(details: &[ProductDetail], path: &Path) -> Result<(), DashError> {
    std::fs::write(path, products_csv(details))?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

/// Forecast series, one row per date; missing values are left empty.
pub fn export_forecast_csv(points: &[ForecastPoint], path: &Path) -> Result<(), DashError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "actual", "predicted", "lower_bound", "upper_bound"])?;
    for point in points {
        writer.write_record([
            point.date.clone(),
            optional(point.actual),
            format!("{:.2}", point.predicted),
            optional(point.lower_bound),
            optional(point.upper_bound),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
