// services/tui-dash/src/app.rs
//
// Routing, page lifecycles and background work for the interactive UI.
//
// Each data page owns a FetchController. Mounting a page spawns its
// `ensure_loaded` on the runtime; leaving the page cancels it. Uploads and
// exports run in the background and report back over an event channel.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use svckit::export::{export_or_log, ExportKind, Exporter};
use svckit::types::ProcessResponse;
use svckit::upload::{upload_and_process, validate_csv_name};
use svckit::{FetchController, FetchStatus, ForecastBackend, Page, RetryPolicy, SessionHandle};

use crate::components::{self, Screen};
use crate::exports;
use crate::state::{DashboardState, UploadStatus, View};

#[derive(Debug)]
pub enum AppEvent {
    Uploaded(Result<ProcessResponse, String>),
    Exported { kind: ExportKind, path: Option<PathBuf> },
}

struct PageHandle {
    controller: Arc<FetchController>,
    status: watch::Receiver<FetchStatus>,
    cancel: CancellationToken,
    task: Option<JoinHandle<FetchStatus>>,
    last_seen: FetchStatus,
}

impl PageHandle {
    fn new(controller: FetchController) -> Self {
        let status = controller.subscribe();
        Self {
            controller: Arc::new(controller),
            status,
            cancel: CancellationToken::new(),
            task: None,
            last_seen: FetchStatus::Idle,
        }
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    fn start(&mut self, force: bool) {
        self.stop();
        self.cancel = CancellationToken::new();
        let controller = self.controller.clone();
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(async move {
            if force {
                controller.retry(cancel).await
            } else {
                controller.ensure_loaded(cancel).await
            }
        }));
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        self.task = None;
    }
}

pub struct App {
    pub state: DashboardState,
    backend: Arc<dyn ForecastBackend>,
    session: SessionHandle,
    exporter: Arc<Exporter>,
    pages: HashMap<Page, PageHandle>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    mode: &'static str,
    should_quit: bool,
}

impl App {
    pub fn new(
        backend: Arc<dyn ForecastBackend>,
        session: SessionHandle,
        policy: RetryPolicy,
        exporter: Exporter,
        mode: &'static str,
    ) -> Self {
        let pages = Page::ALL
            .iter()
            .map(|page| {
                let controller = FetchController::new(*page, backend.clone(), session.clone(), policy.clone());
                (*page, PageHandle::new(controller))
            })
            .collect();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            state: DashboardState::new(),
            backend,
            session,
            exporter: Arc::new(exporter),
            pages,
            events_tx,
            events_rx,
            mode,
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn navigate(&mut self, view: View) {
        if let View::Data(page) = view {
            if self.session.file_id().is_none() {
                self.state.add_log("WARN", &format!("Upload a CSV file before opening the {} page", page));
                self.leave_current();
                self.state.view = View::Upload;
                return;
            }
        }

        if view == self.state.view {
            return;
        }
        self.leave_current();
        self.state.view = view;

        if let View::Data(page) = view {
            if let Some(handle) = self.pages.get_mut(&page) {
                if !handle.is_running() {
                    handle.start(false);
                }
            }
        }
    }

    fn leave_current(&mut self) {
        if let Some(page) = self.state.view.page() {
            if let Some(handle) = self.pages.get_mut(&page) {
                handle.stop();
            }
        }
    }

    /// Manual retry for the page on screen, even after a terminal error.
    pub fn retry_current(&mut self) {
        let Some(page) = self.state.view.page() else {
            return;
        };
        if let Some(handle) = self.pages.get_mut(&page) {
            info!("Manual retry requested for {}", page);
            handle.start(true);
        }
        self.state.add_log("INFO", &format!("Retrying {}", page));
    }

    pub fn submit_upload(&mut self) {
        if self.state.is_uploading() {
            return;
        }
        let path = PathBuf::from(self.state.input.trim());
        if let Err(e) = validate_csv_name(&path) {
            let message = e.user_message("Upload failed");
            self.state.add_log("WARN", &message);
            self.state.upload = UploadStatus::Failed(message);
            return;
        }

        for handle in self.pages.values_mut() {
            handle.stop();
        }
        self.state.upload = UploadStatus::Uploading(path.clone());
        self.state.add_log("INFO", &format!("Uploading {}", path.display()));

        let backend = self.backend.clone();
        let session = self.session.clone();
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = upload_and_process(backend.as_ref(), &session, &path)
                .await
                .map_err(|e| e.user_message("Upload failed"));
            let _ = events.send(AppEvent::Uploaded(result));
        });
    }

    pub fn export(&mut self, key: char) {
        let Some(page) = self.state.view.page() else {
            return;
        };
        let Some(kind) = exports::kind_for_key(page, key) else {
            self.state.add_log("WARN", &format!("No '{}' export on the {} page", key, page));
            return;
        };

        let data = self.session.snapshot();
        let exporter = self.exporter.clone();
        let events = self.events_tx.clone();
        tokio::task::spawn_blocking(move || {
            let path = export_or_log(kind, exports::run_export(&exporter, &data, page, kind));
            let _ = events.send(AppEvent::Exported { kind, path });
        });
    }

    /// Applies finished background work and status changes.
    pub fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply(event);
        }

        for page in Page::ALL {
            let Some(handle) = self.pages.get_mut(&page) else {
                continue;
            };
            let status = handle.status.borrow().clone();
            if status == handle.last_seen {
                continue;
            }
            handle.last_seen = status.clone();

            match &status {
                FetchStatus::Ready => self.state.add_log("INFO", &format!("{} data loaded", page.label())),
                FetchStatus::Retrying { attempt, max, message } => self.state.add_log(
                    "WARN",
                    &format!("{} not ready ({}), retry {}/{}", page.label(), message, attempt, max),
                ),
                FetchStatus::Failed { message } => self.state.add_log("ERROR", message),
                FetchStatus::RedirectToUpload if self.state.view == View::Data(page) => {
                    self.state.view = View::Upload;
                    self.state.add_log("WARN", "No upload in this session, back to the upload page");
                }
                _ => {}
            }
        }
    }

    fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::Uploaded(Ok(processed)) => {
                self.state.add_log(
                    "INFO",
                    &format!("Processed {} rows into {}", processed.rows_processed, processed.file_id),
                );
                self.state.upload = UploadStatus::Done {
                    file_id: processed.file_id,
                    rows: processed.rows_processed,
                    features: processed.features_created,
                };
                match self.state.view {
                    // Opened during the upload: its cache was just cleared.
                    View::Data(page) => {
                        if let Some(handle) = self.pages.get_mut(&page) {
                            handle.start(false);
                        }
                    }
                    View::Upload => self.navigate(View::Data(Page::Forecast)),
                }
            }
            AppEvent::Uploaded(Err(message)) => {
                warn!("Upload failed: {}", message);
                self.state.add_log("ERROR", &message);
                self.state.upload = UploadStatus::Failed(message);
            }
            AppEvent::Exported { kind, path: Some(path) } => {
                let message = format!("Saved {} to {}", kind.label(), path.display());
                self.state.add_log("INFO", &message);
                self.state.last_export = Some(message);
            }
            AppEvent::Exported { kind, path: None } => {
                self.state.add_log("ERROR", &format!("{} export failed, see log file", kind.label()));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match (self.state.view, key.code) {
            (_, KeyCode::Esc) => self.should_quit = true,
            (_, KeyCode::Tab) => self.navigate(self.state.view.next()),
            (View::Upload, KeyCode::Enter) => self.submit_upload(),
            (View::Upload, KeyCode::Backspace) => {
                self.state.input.pop();
            }
            (View::Upload, KeyCode::Char(c)) if !self.state.is_uploading() => self.state.input.push(c),
            (View::Data(_), KeyCode::Char('q')) => self.should_quit = true,
            (View::Data(_), KeyCode::Char(c @ '1'..='4')) => {
                let idx = c as usize - '1' as usize;
                self.navigate(View::ALL[idx]);
            }
            (View::Data(_), KeyCode::Char('r')) => self.retry_current(),
            (View::Data(_), KeyCode::Char(c @ ('p' | 'd' | 'c'))) => self.export(c),
            _ => {}
        }
    }

    pub fn draw(&self, frame: &mut Frame) {
        let session = self.session.snapshot();
        let status = self
            .state
            .view
            .page()
            .and_then(|page| self.pages.get(&page))
            .map(|handle| handle.status.borrow().clone());

        components::draw_ui(
            frame,
            &Screen {
                state: &self.state,
                session: &session,
                status: status.as_ref(),
                mode: self.mode,
            },
        );
    }

    pub fn shutdown(&mut self) {
        for handle in self.pages.values_mut() {
            handle.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::DemoBackend;
    use crossterm::event::KeyModifiers;
    use std::time::Duration;
    use svckit::config::ExportConfig;
    use svckit::Session;

    fn app(not_ready_calls: u32) -> App {
        let backend: Arc<dyn ForecastBackend> = Arc::new(DemoBackend::new(Duration::ZERO, not_ready_calls));
        App::new(
            backend,
            Session::shared(),
            RetryPolicy::default(),
            Exporter::new(&ExportConfig::default()),
            "DEMO",
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[tokio::test]
    async fn test_data_page_without_upload_redirects() {
        let mut app = app(0);
        app.navigate(View::Data(Page::Forecast));
        assert_eq!(app.state.view, View::Upload);
        assert!(app.pages.values().all(|h| h.task.is_none()));
    }

    #[tokio::test]
    async fn test_non_csv_rejected_on_submit() {
        let mut app = app(0);
        for c in "report.pdf".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.upload, UploadStatus::Failed("Please upload a CSV file".to_string()));
        assert!(app.session.file_id().is_none());
    }

    #[tokio::test]
    async fn test_mount_loads_and_leave_cancels() {
        let mut app = app(0);
        app.session.set_file_id("demo-0001");

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.state.view, View::Data(Page::Forecast));
        let task = app.pages.get_mut(&Page::Forecast).unwrap().task.take().unwrap();
        assert_eq!(task.await.unwrap(), FetchStatus::Ready);
        assert!(app.session.has_forecast());

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.state.view, View::Data(Page::Products));
        let products = app.pages.get(&Page::Products).unwrap();
        assert!(products.task.is_some());

        press(&mut app, KeyCode::Char('3'));
        assert!(app.pages.get(&Page::Products).unwrap().cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_tick_logs_status_changes() {
        let mut app = app(0);
        app.session.set_file_id("demo-0001");
        app.navigate(View::Data(Page::Report));
        let task = app.pages.get_mut(&Page::Report).unwrap().task.take().unwrap();
        task.await.unwrap();

        app.tick();
        assert!(app
            .state
            .activity_log
            .iter()
            .any(|entry| entry.message == "report data loaded"));
    }

    #[tokio::test]
    async fn test_page_opened_during_upload_reloads_for_new_file() {
        let mut app = app(0);
        app.session.set_file_id("previous-upload");
        app.navigate(View::Data(Page::Forecast));
        let task = app.pages.get_mut(&Page::Forecast).unwrap().task.take().unwrap();
        assert_eq!(task.await.unwrap(), FetchStatus::Ready);
        assert!(app.session.has_forecast());

        // Upload completes while the forecast page is on screen.
        app.session.set_file_id("demo-0001");
        assert!(!app.session.has_forecast());
        app.apply(AppEvent::Uploaded(Ok(ProcessResponse {
            file_id: "demo-0001".to_string(),
            status: "processed".to_string(),
            rows_processed: 480,
            features_created: 12,
        })));

        assert_eq!(app.state.view, View::Data(Page::Forecast));
        let task = app.pages.get_mut(&Page::Forecast).unwrap().task.take().unwrap();
        assert_eq!(task.await.unwrap(), FetchStatus::Ready);
        assert!(app.session.has_forecast());
        assert_eq!(app.session.file_id().as_deref(), Some("demo-0001"));
    }

    #[tokio::test]
    async fn test_upload_from_upload_page_opens_forecast() {
        let mut app = app(0);
        app.session.set_file_id("demo-0001");
        app.apply(AppEvent::Uploaded(Ok(ProcessResponse {
            file_id: "demo-0001".to_string(),
            status: "processed".to_string(),
            rows_processed: 480,
            features_created: 12,
        })));

        assert_eq!(app.state.view, View::Data(Page::Forecast));
        assert!(app.pages.get(&Page::Forecast).unwrap().task.is_some());
    }
}
