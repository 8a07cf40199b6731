use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    pub static ref API_REQUEST_DURATION: HistogramVec = register_histogram_vec!(
        "api_request_duration_seconds",
        "Forecast backend request duration in seconds",
        &["endpoint", "status"]
    ).unwrap();

    pub static ref API_REQUEST_COUNTER: IntCounterVec = register_int_counter_vec!(
        "api_requests_total",
        "Total number of forecast backend requests",
        &["endpoint", "status"]
    ).unwrap();

    pub static ref FETCH_RETRY_COUNTER: IntCounterVec = register_int_counter_vec!(
        "fetch_retries_total",
        "Automatic retries scheduled by page fetch controllers",
        &["page"]
    ).unwrap();

    pub static ref EXPORT_COUNTER: IntCounterVec = register_int_counter_vec!(
        "exports_total",
        "Export attempts by artifact kind",
        &["kind", "status"]
    ).unwrap();
}

fn status_label(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

pub fn record_request(endpoint: &str, success: bool, duration: f64) {
    let status = status_label(success);
    API_REQUEST_DURATION
        .with_label_values(&[endpoint, status])
        .observe(duration);
    API_REQUEST_COUNTER
        .with_label_values(&[endpoint, status])
        .inc();
}

pub fn record_retry(page: &str) {
    FETCH_RETRY_COUNTER.with_label_values(&[page]).inc();
}

pub fn record_export(kind: &str, success: bool) {
    EXPORT_COUNTER
        .with_label_values(&[kind, status_label(success)])
        .inc();
}

const ENDPOINTS: [&str; 5] = ["upload", "process", "forecast", "products", "report"];
const PAGES: [&str; 3] = ["forecast", "products", "report"];
const STATUSES: [&str; 2] = ["success", "failure"];

/// Total requests issued so far, both outcomes, across endpoints.
pub fn total_requests() -> u64 {
    let mut total = 0;
    for endpoint in ENDPOINTS {
        for status in STATUSES {
            total += API_REQUEST_COUNTER.with_label_values(&[endpoint, status]).get();
        }
    }
    total
}

pub fn total_retries() -> u64 {
    PAGES
        .iter()
        .map(|page| FETCH_RETRY_COUNTER.with_label_values(&[*page]).get())
        .sum()
}

/// Prometheus text exposition of every registered metric.
pub fn render() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    if encoder.encode(&prometheus::gather(), &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
