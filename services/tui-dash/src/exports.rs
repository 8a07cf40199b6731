// services/tui-dash/src/exports.rs
//
// Which artifacts each page can export, and how to build them from a
// session snapshot.

use chrono::Local;
use std::path::PathBuf;

use svckit::export::{ExportKind, Exporter, ForecastChart, ProductsChart};
use svckit::session::SessionData;
use svckit::{DashError, Page};

const REPORT_TITLE: &str = "Restaurant Sales Analysis Report";

/// Export kinds offered on `page`, in key order: image, PDF, CSV.
pub fn page_exports(page: Page) -> &'static [ExportKind] {
    match page {
        Page::Forecast => &[ExportKind::Png, ExportKind::SnapshotPdf, ExportKind::ForecastCsv],
        Page::Products => &[ExportKind::Png, ExportKind::SnapshotPdf, ExportKind::ProductsCsv],
        Page::Report => &[ExportKind::ReportPdf],
    }
}

/// Maps the `p`/`d`/`c` keys to an export on `page`.
pub fn kind_for_key(page: Page, key: char) -> Option<ExportKind> {
    let wanted = |kind: &ExportKind| match key {
        'p' => *kind == ExportKind::Png,
        'd' => matches!(kind, ExportKind::SnapshotPdf | ExportKind::ReportPdf),
        'c' => matches!(kind, ExportKind::ProductsCsv | ExportKind::ForecastCsv),
        _ => false,
    };
    page_exports(page).iter().copied().find(wanted)
}

fn file_stem(page: Page) -> &'static str {
    match page {
        Page::Forecast => "sales_forecast",
        Page::Products => "top_products",
        Page::Report => "sales_report",
    }
}

/// Writes one artifact. Blocking: run it off the async runtime.
pub fn run_export(
    exporter: &Exporter,
    data: &SessionData,
    page: Page,
    kind: ExportKind,
) -> Result<PathBuf, DashError> {
    let name = file_stem(page);
    let points = data.forecast.as_ref().map(|f| f.chart_data.as_slice()).unwrap_or_default();
    let products = data.products.as_ref();
    let shares = products.map(|p| p.chart_data.as_slice()).unwrap_or_default();

    match (page, kind) {
        (Page::Forecast, ExportKind::Png) => exporter.png(&ForecastChart::new(points), name),
        (Page::Forecast, ExportKind::SnapshotPdf) => {
            exporter.snapshot_pdf(&ForecastChart::new(points), name, Some("Sales Forecast"))
        }
        (Page::Forecast, ExportKind::ForecastCsv) => exporter.forecast_csv(points, name),
        (Page::Products, ExportKind::Png) => exporter.png(&ProductsChart::new(shares), name),
        (Page::Products, ExportKind::SnapshotPdf) => {
            exporter.snapshot_pdf(&ProductsChart::new(shares), name, Some("Top Products"))
        }
        (Page::Products, ExportKind::ProductsCsv) => {
            let details = products.map(|p| p.product_details.as_slice()).unwrap_or_default();
            exporter.products_csv(details, name)
        }
        (Page::Report, ExportKind::ReportPdf) => {
            let report = data
                .report()
                .ok_or_else(|| DashError::Export("No report available".to_string()))?;
            let generated_on = Local::now().format("%Y-%m-%d").to_string();
            exporter.report_pdf(&report, name, REPORT_TITLE, &generated_on)
        }
        (page, kind) => Err(DashError::Export(format!(
            "{} export is not available on the {} page",
            kind.label(),
            page
        ))),
    }
}
