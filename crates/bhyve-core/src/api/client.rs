//! API client for the Orbit B-Hyve cloud API.
//!
//! `ApiClient` exchanges credentials for a session token and issues the
//! authenticated reads and device commands the dashboard needs. It never
//! decides whether a token is still usable; callers obtain the token from
//! the `SessionManager` first.

use std::time::Duration;

use chrono::Utc;
use reqwest::{header, Client, Method, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::SessionData;
use crate::models::{DeviceCommand, ProgramToggle, UserId};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL for the Orbit API
pub const DEFAULT_API_BASE_URL: &str = "https://api.orbitbhyve.com/v1";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Header carrying the session token
const API_KEY_HEADER: &str = "orbit-api-key";

/// Header identifying this client to Orbit
const APP_ID_HEADER: &str = "orbit-app-id";

const APP_ID: &str = "Orbit Support Dashboard";

/// Query parameter used to defeat intermediary caching on reads
const CACHE_BUST_PARAM: &str = "t";

const DEVICES: &str = "devices";
const PROGRAMS: &str = "sprinkler_timer_programs";

/// Statuses accepted as success for commands
const COMMAND_SUCCESS: [StatusCode; 3] = [StatusCode::OK, StatusCode::CREATED, StatusCode::NO_CONTENT];

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    session: LoginSession<'a>,
}

#[derive(Debug, Serialize)]
struct LoginSession<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    orbit_api_key: Option<String>,
    user_id: Option<UserId>,
}

/// API client for Orbit.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client against the public Orbit API
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_API_BASE_URL, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    /// Create a client against `base_url` with the given request timeout
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.into();
        let parsed = Url::parse(base_url.trim_end_matches('/'))
            .ok()
            .filter(|url| !url.cannot_be_a_base())
            .ok_or_else(|| ApiError::validation(format!("Invalid API base URL: {}", base_url)))?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: parsed,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Build an upstream URL below the base URL.
    ///
    /// Each segment is percent-encoded on its own, so a caller-supplied id
    /// holding `/`, `?` or `#` stays a single path segment.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if segments.iter().any(|s| matches!(*s, "." | "..")) {
            return Err(ApiError::validation("Invalid resource id"));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::validation("API base URL cannot hold a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Exchange an email and password for a session token
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<SessionData, ApiError> {
        let body = LoginBody {
            session: LoginSession { email, password },
        };

        let response = self
            .client
            .post(self.url(&["session"])?)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;

        let response = Self::check_response(response, &[StatusCode::OK]).await?;
        let text = response.text().await?;
        let auth: AuthResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("login response: {}", e)))?;

        let token = auth
            .orbit_api_key
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("login response has no orbit_api_key".into()))?;

        Ok(SessionData::new(token, auth.user_id))
    }

    fn auth_headers(token: &str) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            API_KEY_HEADER,
            header::HeaderValue::from_str(token)
                .map_err(|_| ApiError::InvalidResponse("token is not a valid header value".into()))?,
        );
        headers.insert(APP_ID_HEADER, header::HeaderValue::from_static(APP_ID));
        Ok(headers)
    }

    fn cache_buster() -> String {
        let millis = Utc::now().timestamp_millis();
        format!("{}.{:03}", millis / 1000, millis % 1000)
    }

    /// Check the response status against `accepted`, returning an error with
    /// the (truncated) body if it does not match.
    async fn check_response(response: Response, accepted: &[StatusCode]) -> Result<Response, ApiError> {
        let status = response.status();
        if accepted.contains(&status) {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Upstream request failed");
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Authenticated read. Only 200 counts as success.
    pub async fn get(&self, token: &str, path: &[&str], query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = self.url(path)?;
        debug!(path = url.path(), "GET");

        let response = self
            .client
            .get(url.clone())
            .headers(Self::auth_headers(token)?)
            .query(&[(CACHE_BUST_PARAM, Self::cache_buster())])
            .query(query)
            .send()
            .await?;

        let response = Self::check_response(response, &[StatusCode::OK]).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", url.path(), e)))
    }

    /// Authenticated command. Returns the parsed body, or `None` when the
    /// upstream answered without a JSON body.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        token: &str,
        method: Method,
        path: &[&str],
        body: &B,
    ) -> Result<Option<Value>, ApiError> {
        let url = self.url(path)?;
        debug!(method = %method, path = url.path(), "Sending command");

        let response = self
            .client
            .request(method, url.clone())
            .headers(Self::auth_headers(token)?)
            .json(body)
            .send()
            .await?;

        let response = Self::check_response(response, &COMMAND_SUCCESS).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(value)),
            Err(_) => {
                debug!(path = url.path(), "Command succeeded with a non-JSON body");
                Ok(None)
            }
        }
    }

    // ===== Reads =====

    pub async fn fetch_devices(&self, token: &str) -> Result<Value, ApiError> {
        self.get(token, &[DEVICES], &[]).await
    }

    pub async fn fetch_device(&self, token: &str, device_id: &str) -> Result<Value, ApiError> {
        self.get(token, &[DEVICES, device_id], &[]).await
    }

    pub async fn fetch_watering_events(
        &self,
        token: &str,
        device_id: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Value, ApiError> {
        let query = [("page", page.to_string()), ("per-page", per_page.to_string())];
        self.get(token, &["watering_events", device_id], &query).await
    }

    pub async fn fetch_programs(&self, token: &str, device_id: &str) -> Result<Value, ApiError> {
        let query = [("device_id", device_id.to_string())];
        self.get(token, &[PROGRAMS], &query).await
    }

    pub async fn fetch_weather(&self, token: &str, device_id: &str) -> Result<Value, ApiError> {
        self.get(token, &["weather_forecast", device_id], &[]).await
    }

    pub async fn fetch_landscapes(&self, token: &str) -> Result<Value, ApiError> {
        self.get(token, &["landscapes"], &[]).await
    }

    // ===== Commands =====

    pub async fn send_command(&self, token: &str, command: &DeviceCommand) -> Result<Option<Value>, ApiError> {
        let path = [DEVICES, command.device_id(), command.action()];
        self.send(token, Method::POST, &path, command).await
    }

    pub async fn toggle_program(&self, token: &str, toggle: &ProgramToggle) -> Result<Option<Value>, ApiError> {
        let program_id = toggle.program_id.to_string();
        self.send(token, Method::PATCH, &[PROGRAMS, &program_id], toggle)
            .await
    }
}
