// services/tui-dash/src/state.rs
//
// Dashboard state: current view, upload input, activity log

use chrono::{DateTime, Local};
use std::path::PathBuf;
use svckit::Page;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Upload,
    Data(Page),
}

impl View {
    pub const ALL: [View; 4] = [
        View::Upload,
        View::Data(Page::Forecast),
        View::Data(Page::Products),
        View::Data(Page::Report),
    ];

    pub fn title(&self) -> &'static str {
        match self {
            View::Upload => "Upload",
            View::Data(Page::Forecast) => "Forecast",
            View::Data(Page::Products) => "Products",
            View::Data(Page::Report) => "Report",
        }
    }

    pub fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> View {
        View::ALL[(self.index() + 1) % View::ALL.len()]
    }

    pub fn page(&self) -> Option<Page> {
        match self {
            View::Upload => None,
            View::Data(page) => Some(*page),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Idle,
    Uploading(PathBuf),
    Done { file_id: String, rows: u64, features: u64 },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: String, // INFO, WARN, ERROR
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub view: View,
    pub input: String,
    pub upload: UploadStatus,
    pub last_export: Option<String>,
    pub activity_log: Vec<LogEntry>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            view: View::Upload,
            input: String::new(),
            upload: UploadStatus::Idle,
            last_export: None,
            activity_log: Vec::new(),
        }
    }

    pub fn add_log(&mut self, level: &str, message: &str) {
        self.activity_log.push(LogEntry {
            timestamp: Local::now(),
            level: level.to_string(),
            message: message.to_string(),
        });

        if self.activity_log.len() > MAX_LOG_ENTRIES {
            self.activity_log.remove(0);
        }
    }

    pub fn is_uploading(&self) -> bool {
        matches!(self.upload, UploadStatus::Uploading(_))
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}
