// Per-page fetch/retry controller.
//
// Idle -> Loading -> Ready
//                 -> Retrying -> (delay) -> Loading
//                 -> Failed -> (manual retry) -> Loading
//
// Attempts are strictly serialized: the next request is only issued after
// the previous one settled and the retry delay elapsed.

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::client::ForecastBackend;
use crate::errors::DashError;
use crate::metrics;
use crate::retry::RetryPolicy;
use crate::session::SessionHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Forecast,
    Products,
    Report,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Forecast, Page::Products, Page::Report];

    pub fn label(&self) -> &'static str {
        match self {
            Page::Forecast => "forecast",
            Page::Products => "products",
            Page::Report => "report",
        }
    }

    pub fn fallback_error(&self) -> &'static str {
        match self {
            Page::Forecast => "Failed to load forecast data",
            Page::Products => "Failed to load product data",
            Page::Report => "Failed to generate report",
        }
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchStatus {
    Idle,
    Loading,
    /// Waiting out the delay before retry number `attempt`.
    Retrying { attempt: u32, max: u32, message: String },
    Ready,
    Failed { message: String },
    /// No upload in this session yet.
    RedirectToUpload,
    Cancelled,
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading | FetchStatus::Retrying { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FetchStatus::Ready | FetchStatus::Failed { .. } | FetchStatus::RedirectToUpload | FetchStatus::Cancelled
        )
    }
}

pub struct FetchController {
    page: Page,
    backend: Arc<dyn ForecastBackend>,
    session: SessionHandle,
    policy: RetryPolicy,
    status: watch::Sender<FetchStatus>,
}

impl FetchController {
    pub fn new(
        page: Page,
        backend: Arc<dyn ForecastBackend>,
        session: SessionHandle,
        policy: RetryPolicy,
    ) -> Self {
        let (status, _) = watch::channel(FetchStatus::Idle);
        Self {
            page,
            backend,
            session,
            policy,
            status,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> FetchStatus {
        self.status.borrow().clone()
    }

    /// Fetches the page's payload unless the session already caches it.
    pub async fn ensure_loaded(&self, cancel: CancellationToken) -> FetchStatus {
        self.run(cancel, false).await
    }

    /// Manual retry: starts a fresh attempt sequence even after a terminal error.
    pub async fn retry(&self, cancel: CancellationToken) -> FetchStatus {
        self.run(cancel, true).await
    }

    async fn run(&self, cancel: CancellationToken, force: bool) -> FetchStatus {
        let Some(file_id) = self.session.file_id() else {
            return self.publish(FetchStatus::RedirectToUpload);
        };

        if !force && self.is_cached() {
            return self.publish(FetchStatus::Ready);
        }

        let mut retries = 0;
        loop {
            self.publish(FetchStatus::Loading);

            let result = tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(),
                result = self.fetch_into_session(&file_id) => result,
            };

            let err = match result {
                Ok(true) => {
                    info!("Loaded {} data for {}", self.page, file_id);
                    return self.publish(FetchStatus::Ready);
                }
                Ok(false) => {
                    info!("{} data for {} arrived after a newer upload, dropped", self.page, file_id);
                    return self.publish(FetchStatus::Cancelled);
                }
                Err(err) => err,
            };

            let message = err.user_message(self.page.fallback_error());
            if !self.policy.should_retry(&err, retries) {
                warn!("Loading {} data for {} failed: {}", self.page, file_id, err);
                return self.publish(FetchStatus::Failed { message });
            }

            retries += 1;
            metrics::record_retry(self.page.label());
            info!(
                "{} data for {} not ready, retry {}/{} in {:?}",
                self.page,
                file_id,
                retries,
                self.policy.max_retries(),
                self.policy.delay()
            );
            self.publish(FetchStatus::Retrying {
                attempt: retries,
                max: self.policy.max_retries(),
                message,
            });

            tokio::select! {
                _ = cancel.cancelled() => return self.cancelled(),
                _ = tokio::time::sleep(self.policy.delay()) => {}
            }
        }
    }

    fn is_cached(&self) -> bool {
        match self.page {
            Page::Forecast => self.session.has_forecast(),
            Page::Products => self.session.has_products(),
            Page::Report => self.session.has_report(),
        }
    }

    /// Returns false when the session moved to another upload meanwhile
    /// and the payload was dropped.
    async fn fetch_into_session(&self, file_id: &str) -> Result<bool, DashError> {
        let stored = match self.page {
            Page::Forecast => {
                let payload = self.backend.forecast(file_id).await?;
                self.session.store_forecast(file_id, payload)
            }
            Page::Products => {
                let payload = self.backend.top_products(file_id).await?;
                self.session.store_products(file_id, payload)
            }
            Page::Report => {
                let payload = self.backend.generate_report(file_id).await?;
                self.session.store_report(file_id, &payload)
            }
        };
        Ok(stored)
    }

    fn cancelled(&self) -> FetchStatus {
        info!("{} fetch cancelled", self.page);
        self.publish(FetchStatus::Cancelled)
    }

    fn publish(&self, status: FetchStatus) -> FetchStatus {
        self.status.send_replace(status.clone());
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use crate::types::{
        ForecastPayload, ForecastPoint, ProcessResponse, ProductsPayload, ReportPayload, UploadResponse,
    };
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::path::Path;
    use std::time::Duration;

    /// Replays scripted forecast/report outcomes and records every call.
    #[derive(Default)]
    struct ScriptedBackend {
        forecast_script: Mutex<VecDeque<Result<ForecastPayload, DashError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn with_forecasts(script: Vec<Result<ForecastPayload, DashError>>) -> Arc<Self> {
            Arc::new(Self {
                forecast_script: Mutex::new(script.into()),
                calls: Mutex::new(vec![]),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl ForecastBackend for ScriptedBackend {
        async fn upload(&self, _path: &Path) -> Result<UploadResponse, DashError> {
            unreachable!("controllers never upload")
        }

        async fn process(&self, _file_id: &str) -> Result<ProcessResponse, DashError> {
            unreachable!("controllers never process")
        }

        async fn forecast(&self, file_id: &str) -> Result<ForecastPayload, DashError> {
            self.calls.lock().push(format!("/forecast/{}", file_id));
            tokio::time::sleep(Duration::from_millis(50)).await;
            self.forecast_script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(DashError::Network("script exhausted".to_string())))
        }

        async fn top_products(&self, file_id: &str) -> Result<ProductsPayload, DashError> {
            self.calls.lock().push(format!("/products/{}", file_id));
            Err(DashError::Api {
                status: StatusCode::NOT_FOUND,
                detail: None,
                code: None,
            })
        }

        async fn generate_report(&self, file_id: &str) -> Result<ReportPayload, DashError> {
            self.calls.lock().push(format!("/report/{}", file_id));
            Ok(ReportPayload {
                summary: "ok".to_string(),
                ..Default::default()
            })
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn not_ready() -> DashError {
        DashError::Api {
            status: StatusCode::BAD_REQUEST,
            detail: Some("Required analysis has not been processed".to_string()),
            code: None,
        }
    }

    fn forecast() -> ForecastPayload {
        ForecastPayload {
            chart_data: vec![ForecastPoint {
                date: "2024-01-01".to_string(),
                actual: Some(10.0),
                predicted: 11.0,
                lower_bound: None,
                upper_bound: None,
            }],
            prediction_results: Default::default(),
            model_details: Default::default(),
        }
    }

    fn session_with(file_id: &str) -> SessionHandle {
        let session = Session::shared();
        session.set_file_id(file_id);
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_not_ready_then_success() {
        let backend = ScriptedBackend::with_forecasts(vec![Err(not_ready()), Err(not_ready()), Ok(forecast())]);
        let session = session_with("abc123");
        let controller = FetchController::new(Page::Forecast, backend.clone(), session.clone(), RetryPolicy::default());

        let start = tokio::time::Instant::now();
        let status = controller.ensure_loaded(CancellationToken::new()).await;

        assert_eq!(status, FetchStatus::Ready);
        assert_eq!(backend.calls().len(), 3);
        // Two 2s delays plus three 50ms requests.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(4150), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(4300), "elapsed {:?}", elapsed);
        assert!(session.has_forecast());
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_ceiling_ends_in_failure() {
        let backend = ScriptedBackend::with_forecasts((0..5).map(|_| Err(not_ready())).collect());
        let controller = FetchController::new(Page::Forecast, backend.clone(), session_with("abc123"), RetryPolicy::default());

        let status = controller.ensure_loaded(CancellationToken::new()).await;

        assert_eq!(
            status,
            FetchStatus::Failed {
                message: "Required analysis has not been processed".to_string()
            }
        );
        // Initial attempt plus three retries.
        assert_eq!(backend.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retrying_status_reports_attempt() {
        let backend = ScriptedBackend::with_forecasts(vec![Err(not_ready()), Ok(forecast())]);
        let controller = Arc::new(FetchController::new(
            Page::Forecast,
            backend.clone(),
            session_with("abc123"),
            RetryPolicy::default(),
        ));
        let mut rx = controller.subscribe();

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.ensure_loaded(CancellationToken::new()).await })
        };

        let mut seen = vec![];
        while rx.changed().await.is_ok() {
            let status = rx.borrow().clone();
            seen.push(status.clone());
            if status.is_terminal() {
                break;
            }
        }
        task.await.unwrap();

        assert!(seen.contains(&FetchStatus::Retrying {
            attempt: 1,
            max: 3,
            message: "Required analysis has not been processed".to_string()
        }));
        assert_eq!(seen.last(), Some(&FetchStatus::Ready));
    }

    #[tokio::test]
    async fn test_other_errors_are_terminal_with_fallback() {
        let backend = ScriptedBackend::with_forecasts(vec![]);
        let controller = FetchController::new(Page::Products, backend.clone(), session_with("abc123"), RetryPolicy::default());

        let status = controller.ensure_loaded(CancellationToken::new()).await;
        assert_eq!(
            status,
            FetchStatus::Failed {
                message: "Failed to load product data".to_string()
            }
        );
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_file_id_redirects_without_request() {
        let backend = ScriptedBackend::with_forecasts(vec![Ok(forecast())]);
        let controller = FetchController::new(Page::Forecast, backend.clone(), Session::shared(), RetryPolicy::default());

        let status = controller.ensure_loaded(CancellationToken::new()).await;
        assert_eq!(status, FetchStatus::RedirectToUpload);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cached_payload_skips_fetch() {
        let backend = ScriptedBackend::with_forecasts(vec![Ok(forecast())]);
        let session = session_with("abc123");
        session.store_forecast("abc123", forecast());
        let controller = FetchController::new(Page::Forecast, backend.clone(), session, RetryPolicy::default());

        assert_eq!(controller.ensure_loaded(CancellationToken::new()).await, FetchStatus::Ready);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_manual_retry_after_failure() {
        let backend = ScriptedBackend::with_forecasts(vec![
            Err(DashError::Network("reset".to_string())),
            Ok(forecast()),
        ]);
        let controller = FetchController::new(Page::Forecast, backend.clone(), session_with("abc123"), RetryPolicy::default());

        let first = controller.ensure_loaded(CancellationToken::new()).await;
        assert!(matches!(first, FetchStatus::Failed { .. }));

        let second = controller.retry(CancellationToken::new()).await;
        assert_eq!(second, FetchStatus::Ready);
        assert_eq!(backend.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay_discards_result() {
        let backend = ScriptedBackend::with_forecasts(vec![Err(not_ready()), Ok(forecast())]);
        let session = session_with("abc123");
        let controller = Arc::new(FetchController::new(
            Page::Forecast,
            backend.clone(),
            session.clone(),
            RetryPolicy::default(),
        ));
        let cancel = CancellationToken::new();

        let task = {
            let controller = controller.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move { controller.ensure_loaded(cancel).await })
        };

        tokio::time::sleep(Duration::from_millis(500)).await;
        cancel.cancel();

        assert_eq!(task.await.unwrap(), FetchStatus::Cancelled);
        assert_eq!(backend.calls().len(), 1);
        assert!(!session.has_forecast());
    }

    #[tokio::test]
    async fn test_report_stored_as_json() {
        let backend = ScriptedBackend::with_forecasts(vec![]);
        let session = session_with("abc123");
        let controller = FetchController::new(Page::Report, backend.clone(), session.clone(), RetryPolicy::default());

        assert_eq!(controller.ensure_loaded(CancellationToken::new()).await, FetchStatus::Ready);
        assert_eq!(session.report().unwrap().summary, "ok");
        assert_eq!(backend.calls(), vec!["/report/abc123".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_result_for_replaced_upload_is_not_ready() {
        let backend = ScriptedBackend::with_forecasts(vec![Ok(forecast())]);
        let session = session_with("abc123");
        let controller = Arc::new(FetchController::new(
            Page::Forecast,
            backend.clone(),
            session.clone(),
            RetryPolicy::default(),
        ));

        let task = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.ensure_loaded(CancellationToken::new()).await })
        };

        // The request is in flight for 50ms; a new upload lands halfway.
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.set_file_id("new-upload");

        assert_eq!(task.await.unwrap(), FetchStatus::Cancelled);
        assert_eq!(controller.status(), FetchStatus::Cancelled);
        assert!(!session.has_forecast());
        assert_eq!(backend.calls(), vec!["/forecast/abc123".to_string()]);
    }
}
