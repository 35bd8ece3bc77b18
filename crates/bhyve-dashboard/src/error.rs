//! Mapping of operation failures onto HTTP responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use bhyve_core::ApiError;

/// Generic API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            success: None,
            error: error.into(),
            details: None,
        }
    }
}

/// An operation failure on its way back to the dashboard
#[derive(Debug)]
pub enum HttpError {
    Api(ApiError),
    /// Failures of `/api/login`, where an upstream rejection means bad credentials
    Login(ApiError),
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        HttpError::Api(err)
    }
}

/// A body that could not be decoded is a bad request, whatever axum's own
/// rejection status would have been.
pub fn undecodable_body(rejection: JsonRejection) -> ApiError {
    ApiError::validation(rejection.body_text())
}

impl From<JsonRejection> for HttpError {
    fn from(rejection: JsonRejection) -> Self {
        HttpError::Api(undecodable_body(rejection))
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        HttpError::Api(ApiError::validation(rejection.body_text()))
    }
}

fn api_failure(err: ApiError) -> (StatusCode, ErrorResponse) {
    match err {
        ApiError::NotAuthenticated => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new("Not authenticated"),
        ),
        ApiError::Validation(message) => (StatusCode::BAD_REQUEST, ErrorResponse::new(message)),
        ApiError::Upstream { status, body } => {
            let status =
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            let response = ErrorResponse {
                details: body,
                ..ErrorResponse::new(format!("API error: {}", status.as_u16()))
            };
            (status, response)
        }
        ApiError::InvalidResponse(message) => {
            error!(error = %message, "Upstream sent an unusable response");
            (StatusCode::BAD_GATEWAY, ErrorResponse::new(message))
        }
        ApiError::Network(e) => {
            error!(error = %e, "Upstream request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::new(e.to_string()))
        }
    }
}

fn login_failure(err: ApiError) -> (StatusCode, ErrorResponse) {
    let (status, mut response) = match err {
        ApiError::Upstream { .. } | ApiError::NotAuthenticated => (
            StatusCode::UNAUTHORIZED,
            ErrorResponse::new("Invalid credentials"),
        ),
        other => api_failure(other),
    };
    response.success = Some(false);
    (status, response)
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            HttpError::Api(err) => api_failure(err),
            HttpError::Login(err) => login_failure(err),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn render(err: HttpError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_authenticated_is_401() {
        let (status, body) = render(ApiError::NotAuthenticated.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Not authenticated"}));
    }

    #[tokio::test]
    async fn test_validation_is_400() {
        let (status, body) = render(ApiError::validation("device_id required").into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "device_id required"}));
    }

    #[tokio::test]
    async fn test_upstream_status_is_passed_through() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, "gone");
        let (status, body) = render(err.into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"error": "API error: 404", "details": "gone"}));
    }

    #[tokio::test]
    async fn test_login_rejection_is_invalid_credentials() {
        let err = ApiError::from_status(StatusCode::FORBIDDEN, "");
        let (status, body) = render(HttpError::Login(err)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "error": "Invalid credentials"}));
    }

    #[tokio::test]
    async fn test_login_validation_keeps_message() {
        let err = ApiError::validation("Email and password required");
        let (status, body) = render(HttpError::Login(err)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Email and password required");
    }
}
