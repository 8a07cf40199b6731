// services/tui-dash/src/headless.rs
//
// Batch mode: upload, load every page, write every export, exit.

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use svckit::export::{export_or_log, Exporter};
use svckit::upload::upload_and_process;
use svckit::{FetchController, FetchStatus, ForecastBackend, Page, RetryPolicy, SessionHandle};

use crate::exports;

#[derive(Debug, Default)]
pub struct HeadlessSummary {
    pub file_id: String,
    pub failed_pages: Vec<Page>,
    pub exported: Vec<PathBuf>,
}

pub async fn run(
    backend: Arc<dyn ForecastBackend>,
    session: SessionHandle,
    policy: RetryPolicy,
    exporter: Exporter,
    file: &Path,
    shutdown: CancellationToken,
) -> Result<HeadlessSummary> {
    let processed = upload_and_process(backend.as_ref(), &session, file).await?;
    info!(
        "Upload processed: {} rows, {} features, file id {}",
        processed.rows_processed, processed.features_created, processed.file_id
    );

    let mut summary = HeadlessSummary {
        file_id: processed.file_id,
        ..Default::default()
    };

    for page in Page::ALL {
        let controller = FetchController::new(page, backend.clone(), session.clone(), policy.clone());
        match controller.ensure_loaded(shutdown.child_token()).await {
            FetchStatus::Ready => info!("Loaded {} data", page),
            FetchStatus::Cancelled => bail!("Interrupted while loading {} data", page),
            other => {
                error!("Could not load {} data: {:?}", page, other);
                summary.failed_pages.push(page);
            }
        }
    }

    let data = session.snapshot();
    let exporter = Arc::new(exporter);
    for page in Page::ALL {
        if summary.failed_pages.contains(&page) {
            continue;
        }
        for &kind in exports::page_exports(page) {
            let exporter = exporter.clone();
            let data = data.clone();
            let path = tokio::task::spawn_blocking(move || {
                export_or_log(kind, exports::run_export(&exporter, &data, page, kind))
            })
            .await?;
            summary.exported.extend(path);
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::DemoBackend;
    use std::time::Duration;
    use svckit::config::ExportConfig;
    use svckit::Session;

    #[tokio::test]
    async fn test_headless_pipeline_writes_every_export() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.csv");
        std::fs::write(&csv, "order_date,total_price\n2024-03-01,24.50\n").unwrap();
        let exporter = Exporter::new(&ExportConfig {
            directory: dir.path().join("exports"),
            ..Default::default()
        });

        let summary = run(
            Arc::new(DemoBackend::new(Duration::ZERO, 0)),
            Session::shared(),
            RetryPolicy::default(),
            exporter,
            &csv,
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(summary.file_id, "demo-0001");
        assert!(summary.failed_pages.is_empty());
        for name in [
            "sales_forecast.png",
            "sales_forecast.pdf",
            "sales_forecast.csv",
            "top_products.png",
            "top_products.pdf",
            "top_products.csv",
            "sales_report.pdf",
        ] {
            assert!(dir.path().join("exports").join(name).exists(), "missing {}", name);
        }
        assert_eq!(summary.exported.len(), 7);
    }

    #[tokio::test]
    async fn test_headless_rejects_non_csv() {
        let dir = tempfile::tempdir().unwrap();
        let result = run(
            Arc::new(DemoBackend::new(Duration::ZERO, 0)),
            Session::shared(),
            RetryPolicy::default(),
            Exporter::new(&ExportConfig::default()),
            &dir.path().join("report.pdf"),
            CancellationToken::new(),
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), "Please upload a CSV file");
    }
}
