//! Authentication module for managing the upstream session.
//!
//! This module provides:
//! - `Credentials`: the email/password pair kept for transparent re-login
//! - `Session`, `SessionData`: the cached token with its fixed validity window
//! - `SessionManager`: the single gate every authenticated call goes through
//!
//! Tokens are held in memory only and are treated as expired 23 hours after
//! they were issued.

pub mod credentials;
pub mod manager;
pub mod session;

pub use credentials::Credentials;
pub use manager::{LoginOutcome, SessionManager, SessionStatus};
pub use session::{Session, SessionData, TOKEN_VALIDITY_HOURS};
