// End-to-end flows against an in-process backend.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use svckit::config::{ApiConfig, RetryConfig};
use svckit::upload::{upload_and_process, NOT_CSV_MESSAGE};
use svckit::{ApiClient, DashError, FetchController, FetchStatus, Page, RetryPolicy, Session};

#[derive(Default)]
struct Hits {
    upload: AtomicUsize,
    process: AtomicUsize,
    forecast: AtomicUsize,
    /// Number of leading forecast calls answered with "not processed".
    forecast_not_ready: AtomicUsize,
}

type Shared = Arc<Hits>;

async fn upload(State(hits): State<Shared>, mut multipart: Multipart) -> Json<serde_json::Value> {
    hits.upload.fetch_add(1, Ordering::SeqCst);
    let mut filename = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        filename = field.file_name().unwrap_or_default().to_string();
        let _ = field.bytes().await.unwrap();
    }
    Json(json!({"file_id": "abc123", "filename": filename, "status": "uploaded"}))
}

async fn process(State(hits): State<Shared>, Path(file_id): Path<String>) -> Json<serde_json::Value> {
    hits.process.fetch_add(1, Ordering::SeqCst);
    Json(json!({"file_id": file_id, "status": "processed", "rows_processed": 480, "features_created": 9}))
}

async fn forecast(State(hits): State<Shared>, Path(file_id): Path<String>) -> Response {
    let call = hits.forecast.fetch_add(1, Ordering::SeqCst);
    assert_eq!(file_id, "abc123");
    if call < hits.forecast_not_ready.load(Ordering::SeqCst) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"detail": "Required analysis has not been processed"})),
        )
            .into_response();
    }
    Json(json!({
        "chart_data": [
            {"date": "2024-03-01", "actual": 410.0, "predicted": 402.5, "lower_bound": 380.0, "upper_bound": 425.0},
            {"date": "2024-03-02", "predicted": 415.0}
        ],
        "prediction_results": {
            "best_model": {"model_type": "linear_regression", "accuracy_score": 0.87},
            "all_models": [],
            "prediction_summary": {"avg_predicted_sales": 408.75, "trend": "increasing"}
        },
        "model_details": {"features": 9}
    }))
    .into_response()
}

async fn spawn_backend(hits: Shared) -> ApiClient {
    let app = Router::new()
        .route("/upload", post(upload))
        .route("/process/:file_id", get(process))
        .route("/forecast/:file_id", get(forecast))
        .with_state(hits);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    ApiClient::new(&ApiConfig {
        base_url: format!("http://{}", addr),
        request_timeout_secs: Some(10),
    })
    .unwrap()
}

fn write_csv(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, "order_id,order_date,quantity,total_price\n1,2024-03-01,2,24.50\n").unwrap();
    path
}

#[tokio::test]
async fn upload_then_forecast_issues_single_request() {
    let hits: Shared = Arc::new(Hits::default());
    let client = Arc::new(spawn_backend(hits.clone()).await);
    let session = Session::shared();
    let dir = tempfile::tempdir().unwrap();

    let processed = upload_and_process(client.as_ref(), &session, &write_csv(&dir, "sales.csv"))
        .await
        .unwrap();
    assert_eq!(processed.rows_processed, 480);
    assert_eq!(session.file_id().as_deref(), Some("abc123"));
    assert!(!session.is_processing());

    let controller = FetchController::new(Page::Forecast, client.clone(), session.clone(), RetryPolicy::default());
    assert_eq!(controller.ensure_loaded(CancellationToken::new()).await, FetchStatus::Ready);
    assert_eq!(hits.forecast.load(Ordering::SeqCst), 1);

    // Cached now: a remount does not hit the backend again.
    assert_eq!(controller.ensure_loaded(CancellationToken::new()).await, FetchStatus::Ready);
    assert_eq!(hits.forecast.load(Ordering::SeqCst), 1);

    let forecast = session.forecast().unwrap();
    assert_eq!(forecast.chart_data.len(), 2);
    assert_eq!(forecast.prediction_results.best_model.display_name(), "linear regression");
}

#[tokio::test]
async fn not_processed_twice_then_success() {
    let hits: Shared = Arc::new(Hits::default());
    hits.forecast_not_ready.store(2, Ordering::SeqCst);
    let client = Arc::new(spawn_backend(hits.clone()).await);
    let session = Session::shared();
    session.set_file_id("abc123");

    let policy = RetryPolicy::from_config(&RetryConfig {
        delay_ms: 20,
        ..Default::default()
    });
    let controller = FetchController::new(Page::Forecast, client, session.clone(), policy);

    assert_eq!(controller.ensure_loaded(CancellationToken::new()).await, FetchStatus::Ready);
    assert_eq!(hits.forecast.load(Ordering::SeqCst), 3);
    assert!(session.has_forecast());
}

#[tokio::test]
async fn non_csv_is_rejected_before_upload() {
    let hits: Shared = Arc::new(Hits::default());
    let client = spawn_backend(hits.clone()).await;
    let session = Session::new();
    let dir = tempfile::tempdir().unwrap();
    let pdf = dir.path().join("report.pdf");
    std::fs::write(&pdf, b"%PDF-1.5").unwrap();

    let err = upload_and_process(&client, &session, &pdf).await.unwrap_err();
    assert!(matches!(err, DashError::Validation(_)));
    assert_eq!(err.to_string(), NOT_CSV_MESSAGE);
    assert_eq!(hits.upload.load(Ordering::SeqCst), 0);
    assert!(session.file_id().is_none());
}
