//! Crate-wide error type.
//!
//! Mirrors the flat, `thiserror`-based error enum style used throughout the
//! provider clients this gateway is patterned after: one enum, string payloads
//! for most variants, a structured variant for upstream API failures, and
//! transparent wraps for the handful of external error types we propagate
//! unchanged.

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("authentication expired: {0}")]
    AuthExpired(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("upstream api error ({status}): {message}")]
    ApiError {
        status: u16,
        message: String,
        body: Option<String>,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("request too large: {0}")]
    RequestTooLarge(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Anthropic-style error `type` discriminator (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    InvalidRequestError,
    AuthenticationError,
    PermissionError,
    NotFoundError,
    RequestTooLarge,
    RateLimitError,
    ApiError,
    OverloadedError,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub r#type: &'static str,
    pub error: ErrorDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub r#type: ErrorType,
    pub message: String,
}

impl GatewayError {
    /// Map this error to the §6 HTTP status and `{type, error}` body shape.
    pub fn to_response(&self, request_id: Option<String>) -> (u16, ErrorBody) {
        let (status, error_type) = match self {
            GatewayError::InvalidRequest(_) => (400, ErrorType::InvalidRequestError),
            GatewayError::AuthExpired(_) => (401, ErrorType::AuthenticationError),
            GatewayError::Permission(_) => (403, ErrorType::PermissionError),
            GatewayError::NotFound(_) => (404, ErrorType::NotFoundError),
            GatewayError::RequestTooLarge(_) => (413, ErrorType::RequestTooLarge),
            GatewayError::RateLimited(_) => (429, ErrorType::RateLimitError),
            GatewayError::UpstreamUnavailable(_) => (529, ErrorType::OverloadedError),
            GatewayError::ApiError { .. } => (500, ErrorType::ApiError),
            GatewayError::Config(_) => (500, ErrorType::ApiError),
            GatewayError::Io(_) | GatewayError::Json(_) | GatewayError::Http(_) => {
                (500, ErrorType::ApiError)
            }
            GatewayError::Internal(_) => (500, ErrorType::ApiError),
        };

        let body = ErrorBody {
            r#type: "error",
            error: ErrorDetail {
                r#type: error_type,
                message: self.to_string(),
            },
            request_id,
        };
        (status, body)
    }

    /// Map an upstream OAuth refresh HTTP status to an error kind (§4.6 step 5).
    pub fn from_refresh_status(status: u16, body: String) -> Self {
        match status {
            401 => GatewayError::AuthExpired(body),
            403 => GatewayError::Permission(body),
            429 => GatewayError::RateLimited(body),
            500..=599 => GatewayError::UpstreamUnavailable(body),
            other => GatewayError::ApiError {
                status: other,
                message: body,
                body: None,
            },
        }
    }
}
