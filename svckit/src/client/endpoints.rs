use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::info;

use super::{ApiClient, ForecastBackend};
use crate::errors::DashError;
use crate::types::{
    ForecastPayload, ProcessResponse, ProductsPayload, ReportEnvelope, ReportPayload, UploadResponse,
};

#[async_trait]
impl ForecastBackend for ApiClient {
    async fn upload(&self, path: &Path) -> Result<UploadResponse, DashError> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload.csv")
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        info!("Uploading {} ({} bytes) to {}", filename, bytes.len(), self.base_url());

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let request = self.client.post(self.url("/upload")).multipart(form);
        self.send_json("upload", request).await
    }

    async fn process(&self, file_id: &str) -> Result<ProcessResponse, DashError> {
        let request = self.client.get(self.url(&format!("/process/{}", file_id)));
        self.send_json("process", request).await
    }

    async fn forecast(&self, file_id: &str) -> Result<ForecastPayload, DashError> {
        let request = self.client.get(self.url(&format!("/forecast/{}", file_id)));
        self.send_json("forecast", request).await
    }

    async fn top_products(&self, file_id: &str) -> Result<ProductsPayload, DashError> {
        let request = self.client.get(self.url(&format!("/products/{}", file_id)));
        self.send_json("products", request).await
    }

    async fn generate_report(&self, file_id: &str) -> Result<ReportPayload, DashError> {
        let request = self.client.post(self.url(&format!("/report/{}", file_id)));
        let envelope: ReportEnvelope = self.send_json("report", request).await?;
        Ok(envelope.report)
    }

    fn name(&self) -> &str {
        self.base_url()
    }
}
