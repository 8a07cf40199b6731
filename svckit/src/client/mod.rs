mod endpoints;
pub mod http;

use async_trait::async_trait;
use std::path::Path;

use crate::errors::DashError;
use crate::types::{ForecastPayload, ProcessResponse, ProductsPayload, ReportPayload, UploadResponse};

pub use http::ApiClient;

/// The five backend calls the dashboard depends on. Each performs exactly
/// one request and returns its decoded body or the error unchanged.
#[async_trait]
pub trait ForecastBackend: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadResponse, DashError>;
    async fn process(&self, file_id: &str) -> Result<ProcessResponse, DashError>;
    async fn forecast(&self, file_id: &str) -> Result<ForecastPayload, DashError>;
    async fn top_products(&self, file_id: &str) -> Result<ProductsPayload, DashError>;
    async fn generate_report(&self, file_id: &str) -> Result<ReportPayload, DashError>;
    fn name(&self) -> &str;
}
