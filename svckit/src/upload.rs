use std::path::Path;
use tracing::{info, warn};

use crate::client::ForecastBackend;
use crate::errors::DashError;
use crate::session::Session;
use crate::types::ProcessResponse;

pub const NOT_CSV_MESSAGE: &str = "Please upload a CSV file";

/// Advisory check on the file name only; the backend does the real parsing.
pub fn validate_csv_name(path: &Path) -> Result<(), DashError> {
    let is_csv = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.ends_with(".csv"))
        .unwrap_or(false);

    if is_csv {
        Ok(())
    } else {
        Err(DashError::Validation(NOT_CSV_MESSAGE.to_string()))
    }
}

/// Uploads `path`, asks the backend to process it, then makes the returned
/// file id the session's current upload.
pub async fn upload_and_process(
    backend: &dyn ForecastBackend,
    session: &Session,
    path: &Path,
) -> Result<ProcessResponse, DashError> {
    validate_csv_name(path)?;

    session.set_processing(true);
    let result = upload_then_process(backend, path).await;
    session.set_processing(false);

    match result {
        Ok(processed) => {
            session.set_file_id(processed.file_id.clone());
            info!(
                "Processed {}: {} rows, {} features (file id {})",
                path.display(),
                processed.rows_processed,
                processed.features_created,
                processed.file_id
            );
            Ok(processed)
        }
        Err(e) => {
            warn!("Upload of {} failed: {}", path.display(), e);
            Err(e)
        }
    }
}

async fn upload_then_process(backend: &dyn ForecastBackend, path: &Path) -> Result<ProcessResponse, DashError> {
    let uploaded = backend.upload(path).await?;
    info!("Uploaded {} as {} ({})", uploaded.filename, uploaded.file_id, uploaded.status);

    let mut processed = backend.process(&uploaded.file_id).await?;
    if processed.file_id.is_empty() {
        processed.file_id = uploaded.file_id;
    }
    Ok(processed)
}
