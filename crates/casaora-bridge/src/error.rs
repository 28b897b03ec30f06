//! Pre-stream error responses.
//!
//! Everything that fails before the upstream stream opens is reported as a
//! single JSON object `{"ok": false, "error": "..."}`. Once streaming starts,
//! failures travel as protocol frames instead.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

/// Errors surfaced to the client before any frame is written.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON payload.")]
    InvalidJson,

    #[error("chatId, org_id, and message are required.")]
    MissingFields,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    UpstreamConnect(String),

    #[error("{message}")]
    UpstreamStatus { status: StatusCode, message: String },
}

impl ApiError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidJson | Self::MissingFields => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::UpstreamConnect(_) => StatusCode::BAD_GATEWAY,
            Self::UpstreamStatus { status, .. } => *status,
        }
    }
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, message } => Self::UpstreamStatus {
                status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            },
            UpstreamError::Connect(e) => Self::UpstreamConnect(e.to_string()),
            UpstreamError::Config(message) => Self::UpstreamConnect(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "ok": false, "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        assert_eq!(ApiError::InvalidJson.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::MissingFields.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_status_is_propagated() {
        let err = ApiError::from(UpstreamError::Status {
            status: 403,
            message: "forbidden".into(),
        });
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.to_string(), "forbidden");
    }

    #[test]
    fn unrepresentable_upstream_status_becomes_bad_gateway() {
        let err = ApiError::from(UpstreamError::Status {
            status: 42,
            message: "odd".into(),
        });
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn config_failure_is_bad_gateway() {
        let err = ApiError::from(UpstreamError::Config("bad base url".into()));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(err.to_string(), "bad base url");
    }
}
