// HTTP client for the forecast backend.
//
// One configured `reqwest::Client` with a fixed base address and a JSON
// content-type default; every endpoint call goes through `send_json`.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::debug;

use crate::config::ApiConfig;
use crate::errors::DashError;
use crate::metrics;
use crate::types::ApiErrorBody;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(crate) client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, DashError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| DashError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        request: RequestBuilder,
    ) -> Result<T, DashError> {
        let start = Instant::now();
        let result = self.execute(request).await;
        let elapsed = start.elapsed().as_secs_f64();
        metrics::record_request(endpoint, result.is_ok(), elapsed);

        match &result {
            Ok(_) => debug!("{} succeeded in {:.3}s", endpoint, elapsed),
            Err(e) => debug!("{} failed in {:.3}s: {}", endpoint, elapsed, e),
        }
        result
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DashError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error_body: ApiErrorBody = serde_json::from_str(&body).unwrap_or_default();
            return Err(DashError::Api {
                status,
                detail: error_body.detail_text(),
                code: error_body.code,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
