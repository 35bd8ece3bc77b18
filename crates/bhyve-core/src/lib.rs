//! Core library for the B-Hyve dashboard proxy.
//!
//! - `auth`: the cached Orbit session and the manager that renews it
//! - `api`: the Orbit HTTP client and error taxonomy
//! - `models`: dashboard requests and upstream command payloads
//! - `dashboard`: the operations the local server exposes
//! - `config`: file and environment configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionManager, SessionStatus};
pub use config::Config;
pub use dashboard::Dashboard;
