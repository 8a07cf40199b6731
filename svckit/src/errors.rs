use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {}", .detail.as_deref().unwrap_or("no detail"))]
    Api {
        status: StatusCode,
        detail: Option<String>,
        code: Option<String>,
    },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("{0}")]
    Validation(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request cancelled")]
    Cancelled,
}

impl DashError {
    /// Message shown to the user: the server-supplied detail when there is
    /// one, otherwise `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            DashError::Api { detail: Some(detail), .. } if !detail.trim().is_empty() => detail.clone(),
            DashError::Validation(msg) => msg.clone(),
            _ => fallback.to_string(),
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            DashError::Api { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            DashError::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for DashError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            DashError::Decode(err.to_string())
        } else {
            DashError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for DashError {
    fn from(err: serde_json::Error) -> Self {
        DashError::Decode(err.to_string())
    }
}

impl From<config::ConfigError> for DashError {
    fn from(err: config::ConfigError) -> Self {
        DashError::Config(err.to_string())
    }
}

impl From<image::ImageError> for DashError {
    fn from(err: image::ImageError) -> Self {
        DashError::Export(err.to_string())
    }
}

impl From<lopdf::Error> for DashError {
    fn from(err: lopdf::Error) -> Self {
        DashError::Export(err.to_string())
    }
}

impl From<csv::Error> for DashError {
    fn from(err: csv::Error) -> Self {
        DashError::Export(err.to_string())
    }
}
