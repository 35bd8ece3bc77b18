use chrono::{DateTime, Duration, Utc};

use super::Credentials;
use crate::models::UserId;

/// Token validity window in hours.
/// Orbit tokens last about a day; renewing after 23 hours stays clear of the edge.
pub const TOKEN_VALIDITY_HOURS: i64 = 23;

/// A token issued by the upstream API, with the moment it was issued.
///
/// Expiry is always derived from `created_at`, so it cannot drift from the
/// token it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub token: String,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, user_id: Option<UserId>) -> Self {
        Self {
            token,
            user_id,
            created_at: Utc::now(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::hours(TOKEN_VALIDITY_HOURS)
    }

    /// The token is expired from the exact end of the window onwards
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at() - Utc::now()
    }

    /// Get minutes remaining until expiry (for logging)
    pub fn minutes_until_expiry(&self) -> i64 {
        self.time_until_expiry().num_minutes().max(0)
    }
}

/// The single process-wide session record.
///
/// Created empty, filled by a successful login, overwritten in place by a
/// re-login and emptied by logout.
#[derive(Debug, Default)]
pub struct Session {
    pub credentials: Option<Credentials>,
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful login
    pub fn update(&mut self, credentials: Credentials, data: SessionData) {
        self.credentials = Some(credentials);
        self.data = Some(data);
    }

    /// Forget everything, credentials included
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Get the token if one has been issued, expired or not
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    /// Get the user ID if session exists
    pub fn user_id(&self) -> Option<&UserId> {
        self.data.as_ref().and_then(|d| d.user_id.as_ref())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.data
            .as_ref()
            .map(|d| !d.is_expired_at(now))
            .unwrap_or(false)
    }

    /// Check if session is valid (token exists and not expired)
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
