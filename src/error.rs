// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::mailchimp::{CredentialError, UpstreamError};

/// HTTP API error, rendered as `{ "error": ..., "details"?: ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request - local validation, nothing was sent upstream
    BadRequest(String),
    InvalidJson(String),

    // 400 Bad Request - Mailchimp answered with a non-2xx status
    UpstreamRejected(String),
    UpstreamRejectedWith(Value),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error - request sent, no response
    NoResponse(String),

    // 500 Internal Server Error - request could not be issued
    RequestSetup(String),

    // 502 Bad Gateway (upstream answered with something unusable)
    BadGateway(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::UpstreamRejected(_) => 400,
            ApiError::UpstreamRejectedWith(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::NoResponse(_) => 500,
            ApiError::RequestSetup(_) => 500,
            ApiError::BadGateway(_) => 502,
        }
    }

    /// Get client-facing error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::InvalidJson(msg) => msg,
            ApiError::UpstreamRejected(detail) => detail,
            ApiError::UpstreamRejectedWith(_) => "Mailchimp rejected the request",
            ApiError::NotFound(msg) => msg,
            ApiError::NoResponse(_) => "No response received from Mailchimp API",
            ApiError::RequestSetup(_) => "Error setting up request to Mailchimp API",
            ApiError::BadGateway(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::NoResponse(details) | ApiError::RequestSetup(details) => json!({
                "error": self.message(),
                "details": details,
            }),
            ApiError::UpstreamRejectedWith(errors) => json!({ "error": errors }),
            _ => json!({ "error": self.message() }),
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        ApiError::BadGateway(message.into())
    }

    /// Like the plain conversion, except a rejection reports the upstream
    /// `errors` list instead of `detail`.
    pub fn with_upstream_errors(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Rejected { body, .. } => match body.get("errors") {
                Some(errors) if !errors.is_null() => ApiError::UpstreamRejectedWith(errors.clone()),
                _ => ApiError::UpstreamRejected("Unknown error".into()),
            },
            other => other.into(),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Rejected { detail, .. } => ApiError::UpstreamRejected(detail),
            UpstreamError::NoResponse(msg) => ApiError::NoResponse(msg),
            UpstreamError::Request(msg) => ApiError::RequestSetup(msg),
            other @ (UpstreamError::UnexpectedBody(_) | UpstreamError::PageLimit(_)) => {
                ApiError::bad_gateway(other.to_string())
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
