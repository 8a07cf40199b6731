// svckit - client kit for the restaurant sales forecast backend
//
// HTTP client and endpoint calls, session state, per-page fetch
// controllers, upload flow and PNG/PDF/CSV exporters.

pub mod client;
pub mod config;
pub mod controller;
pub mod errors;
pub mod export;
pub mod metrics;
pub mod retry;
pub mod session;
pub mod types;
pub mod upload;

pub use client::{ApiClient, ForecastBackend};
pub use controller::{FetchController, FetchStatus, Page};
pub use errors::DashError;
pub use retry::RetryPolicy;
pub use session::{Session, SessionHandle};
