pub mod charts;
pub mod csv;
pub mod pdf;
pub mod png;

use image::RgbImage;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::config::ExportConfig;
use crate::errors::DashError;
use crate::metrics;
use crate::types::{ForecastPoint, ProductDetail, ReportPayload};

pub use charts::{ForecastChart, ProductsChart, NO_FORECAST_DATA, NO_PRODUCT_DATA};

/// A rendered region that can be turned into pixels.
pub trait Rasterize {
    fn rasterize(&self, width: u32, height: u32) -> Result<RgbImage, DashError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Png,
    SnapshotPdf,
    ReportPdf,
    ProductsCsv,
    ForecastCsv,
}

impl ExportKind {
    pub fn label(&self) -> &'static str {
        match self {
            ExportKind::Png => "png",
            ExportKind::SnapshotPdf => "snapshot_pdf",
            ExportKind::ReportPdf => "report_pdf",
            ExportKind::ProductsCsv => "products_csv",
            ExportKind::ForecastCsv => "forecast_csv",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportKind::Png => "png",
            ExportKind::SnapshotPdf | ExportKind::ReportPdf => "pdf",
            ExportKind::ProductsCsv | ExportKind::ForecastCsv => "csv",
        }
    }
}

/// Writes `<name>.<ext>` artifacts into the export directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    directory: PathBuf,
    width: u32,
    height: u32,
}

impl Exporter {
    pub fn new(config: &ExportConfig) -> Self {
        Self {
            directory: config.directory.clone(),
            width: config.image_width,
            height: config.image_height,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn target(&self, name: &str, kind: ExportKind) -> Result<PathBuf, DashError> {
        std::fs::create_dir_all(&self.directory)?;
        Ok(self.directory.join(format!("{}.{}", name, kind.extension())))
    }

    pub fn png(&self, region: &dyn Rasterize, name: &str) -> Result<PathBuf, DashError> {
        let path = self.target(name, ExportKind::Png)?;
        png::export_png(region, self.width, self.height, &path)?;
        Ok(path)
    }

    pub fn snapshot_pdf(&self, region: &dyn Rasterize, name: &str, title: Option<&str>) -> Result<PathBuf, DashError> {
        let path = self.target(name, ExportKind::SnapshotPdf)?;
        pdf::export_snapshot_pdf(region, self.width, self.height, title, &path)?;
        Ok(path)
    }

    pub fn report_pdf(&self, report: &ReportPayload, name: &str, title: &str, generated_on: &str) -> Result<PathBuf, DashError> {
        let path = self.target(name, ExportKind::ReportPdf)?;
        pdf::export_report_pdf(report, title, generated_on, &path)?;
        Ok(path)
    }

    pub fn products_csv(&self, details: &[ProductDetail], name: &str) -> Result<PathBuf, DashError> {
        let path = self.target(name, ExportKind::ProductsCsv)?;
        self::csv::export_products_csv(details, &path)?;
        Ok(path)
    }

    pub fn forecast_csv(&self, points: &[ForecastPoint], name: &str) -> Result<PathBuf, DashError> {
        let path = self.target(name, ExportKind::ForecastCsv)?;
        self::csv::export_forecast_csv(points, &path)?;
        Ok(path)
    }
}

/// Exports never fail the caller: errors are logged and swallowed.
pub fn export_or_log(kind: ExportKind, result: Result<PathBuf, DashError>) -> Option<PathBuf> {
    match result {
        Ok(path) => {
            metrics::record_export(kind.label(), true);
            info!("Exported {} to {}", kind.label(), path.display());
            Some(path)
        }
        Err(e) => {
            metrics::record_export(kind.label(), false);
            error!("Export {} failed: {}", kind.label(), e);
            None
        }
    }
}
