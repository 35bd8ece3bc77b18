use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("API error: {status}")]
    Upstream {
        status: reqwest::StatusCode,
        body: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Validation(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let body = if body.trim().is_empty() {
            None
        } else {
            Some(Self::truncate_body(body))
        };
        ApiError::Upstream { status, body }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    /// Upstream status code, if the failure came from an HTTP response
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}
