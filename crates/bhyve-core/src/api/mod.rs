//! REST API client module for the Orbit B-Hyve cloud service.
//!
//! This module provides the `ApiClient` for communicating with the Orbit API
//! and the `ApiError` taxonomy every dashboard operation reports failures in.
//!
//! The API uses a session token sent in the `orbit-api-key` header, obtained
//! by posting the account email and password to `/session`.

pub mod client;
pub mod error;

pub use client::{ApiClient, DEFAULT_API_BASE_URL, REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
