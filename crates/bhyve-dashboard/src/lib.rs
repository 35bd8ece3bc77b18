//! Local HTTP front end for the B-Hyve dashboard.
//!
//! Exposes the `/api/*` routes the dashboard page calls, backed by a single
//! shared `bhyve_core::Dashboard`.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;

pub use server::{app, start_server, AppState};
