//! Error handling and custom error types
//!
//! Provides unified error handling across the relay using thiserror. Every
//! variant maps to a stable error kind and HTTP status so callers can tell a
//! misconfigured relay apart from a failing upstream.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Unexpected response shape: {0}")]
    ResponseShape(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Machine-readable error category reported to HTTP callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "configuration_error",
            Error::Parse(_) => "parse_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Upstream(_) | Error::Http(_) => "upstream_error",
            Error::ResponseShape(_) => "response_shape_error",
            Error::Serialization(_) | Error::Io(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Parse(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::Upstream(_) | Error::Http(_) | Error::ResponseShape(_) => {
                StatusCode::BAD_GATEWAY
            }
            Error::Configuration(_) | Error::Serialization(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });

        (self.status(), Json(body)).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_distinct_per_category() {
        let errors = [
            Error::Configuration("x".to_string()),
            Error::Parse("x".to_string()),
            Error::InvalidRequest("x".to_string()),
            Error::Upstream("x".to_string()),
            Error::ResponseShape("x".to_string()),
        ];

        let mut kinds: Vec<&str> = errors.iter().map(Error::kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        assert_eq!(kinds.len(), errors.len());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::Configuration("missing key".to_string()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::InvalidRequest("no query".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::ResponseShape("no candidates".to_string()).status(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[tokio::test]
    async fn test_into_response_body_carries_kind() {
        let response = Error::Upstream("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["kind"], "upstream_error");
        assert_eq!(body["error"]["message"], "Upstream error: boom");
    }
}
