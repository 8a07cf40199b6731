// Session state shared between the upload flow and the page controllers.
//
// Each controller writes only its own payload field; the upload flow owns
// `file_id` and `is_processing`.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::types::{ForecastPayload, ProductsPayload, ReportPayload};

pub type SessionHandle = Arc<Session>;

#[derive(Debug, Clone, Default)]
pub struct SessionData {
    pub file_id: Option<String>,
    pub is_processing: bool,
    pub forecast: Option<ForecastPayload>,
    pub products: Option<ProductsPayload>,
    /// JSON-encoded `ReportPayload`.
    pub report: Option<String>,
}

impl SessionData {
    pub fn report(&self) -> Option<ReportPayload> {
        decode_report(self.report.as_deref()?)
    }
}

#[derive(Debug, Default)]
pub struct Session {
    inner: RwLock<SessionData>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SessionHandle {
        Arc::new(Self::new())
    }

    pub fn file_id(&self) -> Option<String> {
        self.inner.read().file_id.clone()
    }

    /// Switching to a different upload drops every cached payload so results
    /// from the previous file are never shown for the new one.
    pub fn set_file_id(&self, file_id: impl Into<String>) {
        let file_id = file_id.into();
        let mut data = self.inner.write();
        if data.file_id.as_deref() != Some(file_id.as_str()) {
            debug!("Session file id changed to {}, clearing cached results", file_id);
            data.forecast = None;
            data.products = None;
            data.report = None;
        }
        data.file_id = Some(file_id);
    }

    pub fn is_processing(&self) -> bool {
        self.inner.read().is_processing
    }

    pub fn set_processing(&self, processing: bool) {
        self.inner.write().is_processing = processing;
    }

    pub fn forecast(&self) -> Option<ForecastPayload> {
        self.inner.read().forecast.clone()
    }

    pub fn products(&self) -> Option<ProductsPayload> {
        self.inner.read().products.clone()
    }

    pub fn report(&self) -> Option<ReportPayload> {
        self.inner.read().report()
    }

    pub fn report_json(&self) -> Option<String> {
        self.inner.read().report.clone()
    }

    pub fn has_forecast(&self) -> bool {
        self.inner.read().forecast.is_some()
    }

    pub fn has_products(&self) -> bool {
        self.inner.read().products.is_some()
    }

    pub fn has_report(&self) -> bool {
        self.inner.read().report.is_some()
    }

    /// Stores the payload only if `file_id` is still the current upload.
    pub fn store_forecast(&self, file_id: &str, payload: ForecastPayload) -> bool {
        let mut data = self.inner.write();
        if !is_current(&data, file_id, "forecast") {
            return false;
        }
        data.forecast = Some(payload);
        true
    }

    pub fn store_products(&self, file_id: &str, payload: ProductsPayload) -> bool {
        let mut data = self.inner.write();
        if !is_current(&data, file_id, "products") {
            return false;
        }
        data.products = Some(payload);
        true
    }

    pub fn store_report(&self, file_id: &str, payload: &ReportPayload) -> bool {
        let encoded = encode_report(payload);
        let mut data = self.inner.write();
        if !is_current(&data, file_id, "report") {
            return false;
        }
        data.report = Some(encoded);
        true
    }

    pub fn snapshot(&self) -> SessionData {
        self.inner.read().clone()
    }

    pub fn clear(&self) {
        *self.inner.write() = SessionData::default();
    }
}

fn is_current(data: &SessionData, file_id: &str, field: &str) -> bool {
    if data.file_id.as_deref() == Some(file_id) {
        return true;
    }
    warn!(
        "Discarding {} result for superseded file {} (current: {:?})",
        field, file_id, data.file_id
    );
    false
}

pub fn encode_report(report: &ReportPayload) -> String {
    // A struct of strings and string lists always serializes.
    serde_json::to_string(report).unwrap_or_default()
}

pub fn decode_report(raw: &str) -> Option<ReportPayload> {
    match serde_json::from_str(raw) {
        Ok(report) => Some(report),
        Err(e) => {
            warn!("Stored report is not valid JSON: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> ReportPayload {
        ReportPayload {
            summary: "Sales grew steadily with a weekend peak.".to_string(),
            insights: vec!["Fridays are strongest".to_string(), "Pizza leads revenue".to_string()],
            recommendations: vec!["Staff up on Fridays".to_string()],
            future_outlook: "Expect 5% growth next month.".to_string(),
        }
    }

    fn empty_forecast() -> ForecastPayload {
        ForecastPayload {
            chart_data: vec![],
            prediction_results: Default::default(),
            model_details: Default::default(),
        }
    }

    #[test]
    fn test_report_round_trip_through_session() {
        let session = Session::new();
        session.set_file_id("abc123");
        let report = sample_report();

        assert!(session.store_report("abc123", &report));
        assert!(session.report_json().unwrap().contains("Pizza leads revenue"));
        assert_eq!(session.report(), Some(report));
    }

    #[test]
    fn test_new_file_id_clears_cached_payloads() {
        let session = Session::new();
        session.set_file_id("first");
        assert!(session.store_forecast("first", empty_forecast()));
        assert!(session.store_report("first", &sample_report()));

        session.set_file_id("first");
        assert!(session.has_forecast());

        session.set_file_id("second");
        assert!(!session.has_forecast());
        assert!(!session.has_report());
        assert_eq!(session.file_id().as_deref(), Some("second"));
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let session = Session::new();
        session.set_file_id("second");
        assert!(!session.store_forecast("first", empty_forecast()));
        assert!(!session.has_forecast());
    }

    #[test]
    fn test_store_without_file_id_is_rejected() {
        let session = Session::new();
        assert!(!session.store_report("abc123", &sample_report()));
        assert!(session.snapshot().report.is_none());
    }
}
