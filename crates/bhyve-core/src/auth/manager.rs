//! Token lifecycle management.
//!
//! `SessionManager` owns the one `Session` and is the only way to read or
//! change it. Every access goes through a single async mutex. A refresh
//! holds the lock for the whole upstream login, so callers that arrive while
//! a refresh is running wait for it and then see the renewed token instead of
//! starting their own login.

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{Credentials, Session};
use crate::api::{ApiClient, ApiError};
use crate::models::UserId;

/// What the dashboard's status endpoint reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionStatus {
    pub authenticated: bool,
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub user_id: Option<UserId>,
}

pub struct SessionManager {
    api: ApiClient,
    session: Mutex<Session>,
}

impl SessionManager {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            session: Mutex::new(Session::new()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Whether the cached token can be used right now. Never touches the network.
    pub async fn is_valid(&self) -> bool {
        self.session.lock().await.is_valid()
    }

    /// Make sure a usable token exists, renewing it with the stored
    /// credentials if it has expired.
    pub async fn ensure_valid(&self) -> bool {
        self.authorized_token().await.is_ok()
    }

    /// Return a usable token, renewing it first if needed.
    ///
    /// Fails with `NotAuthenticated` when nobody has logged in or the renewal
    /// was rejected. A failed renewal leaves the expired token in place so the
    /// next call tries again.
    pub async fn authorized_token(&self) -> Result<String, ApiError> {
        let mut session = self.session.lock().await;

        if session.is_valid() {
            if let Some(token) = session.token() {
                return Ok(token.to_string());
            }
        }

        let Some(credentials) = session.credentials.as_ref() else {
            debug!("No stored credentials, cannot renew session");
            return Err(ApiError::NotAuthenticated);
        };

        info!(email = credentials.email(), "Session token expired, renewing");
        let result = self
            .api
            .authenticate(credentials.email(), credentials.password())
            .await;

        match result {
            Ok(data) => {
                let token = data.token.clone();
                debug!(minutes = data.minutes_until_expiry(), "Session renewed");
                session.data = Some(data);
                Ok(token)
            }
            Err(e) => {
                warn!(error = %e, "Session renewal failed");
                Err(ApiError::NotAuthenticated)
            }
        }
    }

    /// Log in with a new email and password.
    ///
    /// On failure the previous session, valid or not, is left as it was.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, ApiError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ApiError::validation("Email and password required"));
        }

        let mut session = self.session.lock().await;
        let data = match self.api.authenticate(email, password).await {
            Ok(data) => data,
            Err(e) => {
                warn!(email = email, error = %e, "Login failed");
                return Err(e);
            }
        };

        let user_id = data.user_id.clone();
        session.update(Credentials::new(email, password), data);
        info!(email = email, user_id = ?user_id, "Logged in");

        Ok(LoginOutcome { user_id })
    }

    /// Forget the token and the stored credentials
    pub async fn logout(&self) {
        self.session.lock().await.clear();
        info!("Logged out");
    }

    /// Report the current session. Waits while a login or renewal is in
    /// flight, so the answer always reflects its outcome.
    pub async fn status(&self) -> SessionStatus {
        let session = self.session.lock().await;
        SessionStatus {
            authenticated: session.is_valid(),
            user_id: session.user_id().cloned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration as StdDuration;

    use chrono::{Duration, Utc};
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::auth::{SessionData, TOKEN_VALIDITY_HOURS};
    use crate::models::ResourceId;

    async fn setup() -> (MockServer, SessionManager) {
        let server = MockServer::start().await;
        let api = ApiClient::with_base_url(server.uri(), StdDuration::from_secs(5)).unwrap();
        (server, SessionManager::new(api))
    }

    fn login_ok(token: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"orbit_api_key": token, "user_id": 42}))
    }

    /// Put an expired token for `a@b.c` into the session
    async fn seed_expired(manager: &SessionManager) -> SessionData {
        let stale = SessionData {
            token: "old".to_string(),
            user_id: Some(ResourceId::Numeric(42)),
            created_at: Utc::now() - Duration::hours(TOKEN_VALIDITY_HOURS + 1),
        };
        manager
            .session
            .lock()
            .await
            .update(Credentials::new("a@b.c", "pw"), stale.clone());
        stale
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let (server, manager) = setup().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(body_json(json!({"session": {"email": "a@b.c", "password": "pw"}})))
            .respond_with(login_ok("abc"))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = manager.login("a@b.c", "pw").await.unwrap();
        assert_eq!(outcome.user_id, Some(ResourceId::Numeric(42)));
        assert!(manager.is_valid().await);

        manager.logout().await;
        assert!(!manager.is_valid().await);
        let status = manager.status().await;
        assert!(!status.authenticated);
        assert_eq!(status.user_id, None);
        // Logout also drops the credentials, so nothing can be renewed
        assert!(!manager.ensure_valid().await);
    }

    #[tokio::test]
    async fn test_ensure_valid_without_credentials_makes_no_calls() {
        let (server, manager) = setup().await;

        assert!(!manager.ensure_valid().await);
        assert!(matches!(
            manager.authorized_token().await,
            Err(ApiError::NotAuthenticated)
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_token_is_reused() {
        let (server, manager) = setup().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(login_ok("abc"))
            .expect(1)
            .mount(&server)
            .await;

        manager.login("a@b.c", "pw").await.unwrap();
        for _ in 0..3 {
            assert_eq!(manager.authorized_token().await.unwrap(), "abc");
        }
    }

    #[tokio::test]
    async fn test_expired_token_is_renewed() {
        let (server, manager) = setup().await;
        seed_expired(&manager).await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(login_ok("fresh"))
            .expect(1)
            .mount(&server)
            .await;

        assert!(!manager.is_valid().await);
        assert_eq!(manager.authorized_token().await.unwrap(), "fresh");
        assert!(manager.is_valid().await);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_collapse_into_one_login() {
        let (server, manager) = setup().await;
        seed_expired(&manager).await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(login_ok("fresh").set_delay(StdDuration::from_millis(200)))
            .expect(1)
            .mount(&server)
            .await;

        let manager = Arc::new(manager);
        let checks = (0..5).map(|_| {
            let manager = Arc::clone(&manager);
            async move { manager.ensure_valid().await }
        });
        let results = futures::future::join_all(checks).await;

        assert!(results.into_iter().all(|ok| ok));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_expired_token() {
        let (server, manager) = setup().await;
        let stale = seed_expired(&manager).await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;

        assert!(!manager.ensure_valid().await);
        {
            let session = manager.session.lock().await;
            assert_eq!(session.data.as_ref(), Some(&stale));
            assert!(session.credentials.is_some());
        }

        // The next check retries
        assert!(!manager.ensure_valid().await);
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_session() {
        let (server, manager) = setup().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(body_json(json!({"session": {"email": "a@b.c", "password": "pw"}})))
            .respond_with(login_ok("abc"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .and(body_json(json!({"session": {"email": "a@b.c", "password": "wrong"}})))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid email or password"))
            .mount(&server)
            .await;

        manager.login("a@b.c", "pw").await.unwrap();
        let err = manager.login("a@b.c", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));

        assert!(manager.is_valid().await);
        assert_eq!(manager.authorized_token().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_login_without_token_in_response_fails() {
        let (server, manager) = setup().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user_id": 42})))
            .mount(&server)
            .await;

        let err = manager.login("a@b.c", "pw").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
        assert!(!manager.is_valid().await);
    }

    #[tokio::test]
    async fn test_login_rejects_blank_input_locally() {
        let (server, manager) = setup().await;

        assert!(matches!(
            manager.login("", "pw").await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            manager.login("a@b.c", "").await,
            Err(ApiError::Validation(_))
        ));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_reports_user_id() {
        let (server, manager) = setup().await;
        Mock::given(method("POST"))
            .and(path("/session"))
            .respond_with(login_ok("abc"))
            .mount(&server)
            .await;

        manager.login("a@b.c", "pw").await.unwrap();
        assert_eq!(
            manager.status().await,
            SessionStatus {
                authenticated: true,
                user_id: Some(ResourceId::Numeric(42)),
            }
        );
    }
}
