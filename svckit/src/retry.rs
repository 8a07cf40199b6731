use std::time::Duration;

use crate::config::RetryConfig;
use crate::errors::DashError;

/// Structured error code the backend may send instead of relying on wording.
pub const NOT_READY_CODE: &str = "not_ready";

/// Bounded, fixed-delay retry for "analysis not ready yet" responses.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
    not_ready_markers: Vec<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            delay: Duration::from_millis(config.delay_ms),
            not_ready_markers: config.not_ready_markers.clone(),
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// A structured `not_ready` code wins; otherwise fall back to matching
    /// the detail text against the known markers.
    pub fn is_not_ready(&self, err: &DashError) -> bool {
        if let Some(code) = err.code() {
            return code == NOT_READY_CODE;
        }
        match err.detail() {
            Some(detail) => self
                .not_ready_markers
                .iter()
                .any(|marker| detail.contains(marker.as_str())),
            None => false,
        }
    }

    pub fn should_retry(&self, err: &DashError, retries: u32) -> bool {
        retries < self.max_retries && self.is_not_ready(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn api_error(detail: Option<&str>, code: Option<&str>) -> DashError {
        DashError::Api {
            status: StatusCode::BAD_REQUEST,
            detail: detail.map(str::to_string),
            code: code.map(str::to_string),
        }
    }

    #[test]
    fn test_not_ready_markers() {
        let policy = RetryPolicy::default();
        assert!(policy.is_not_ready(&api_error(Some("Required analysis has not been processed"), None)));
        assert!(policy.is_not_ready(&api_error(Some("Data has not been processed yet"), None)));
        assert!(!policy.is_not_ready(&api_error(Some("File not found"), None)));
        assert!(!policy.is_not_ready(&api_error(None, None)));
        assert!(!policy.is_not_ready(&DashError::Network("refused".to_string())));
    }

    #[test]
    fn test_structured_code_takes_precedence() {
        let policy = RetryPolicy::default();
        assert!(policy.is_not_ready(&api_error(Some("busy"), Some("not_ready"))));
        assert!(!policy.is_not_ready(&api_error(Some("Required analysis missing"), Some("invalid_file"))));
    }

    #[test]
    fn test_retry_ceiling() {
        let policy = RetryPolicy::default();
        let err = api_error(Some("Required analysis has not been processed"), None);
        assert!(policy.should_retry(&err, 0));
        assert!(policy.should_retry(&err, 2));
        assert!(!policy.should_retry(&err, 3));
        assert_eq!(policy.delay(), Duration::from_secs(2));
    }
}
