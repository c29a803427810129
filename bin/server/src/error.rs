//! HTTP error responses.
//!
//! Every handler failure becomes a JSON body `{success: false, error}` with
//! a status matching the error taxonomy. Nothing escapes as a bare 500.

use area_portal_auth_client::AuthClientError;
use area_portal_auth_client::error::UNREACHABLE_MESSAGE;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rootcause::prelude::Report;
use serde_json::json;
use std::fmt;

/// Errors returned by API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The request was malformed or missing a field. No upstream call was made.
    BadRequest { message: String },
    /// No session cookie, or the session was rejected.
    Unauthorized { message: String },
    /// The Auth Service refused; its status and message are preserved.
    Upstream { status: u16, message: String },
    /// The Auth Service could not be reached.
    Unreachable { details: String },
    /// A failure inside this server.
    Internal { details: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Unreachable { .. } => StatusCode::BAD_GATEWAY,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest { message } => write!(f, "bad request: {}", message),
            Self::Unauthorized { message } => write!(f, "unauthorized: {}", message),
            Self::Upstream { status, message } => {
                write!(f, "auth service answered {}: {}", status, message)
            }
            Self::Unreachable { details } => write!(f, "auth service unreachable: {}", details),
            Self::Internal { details } => write!(f, "internal error: {}", details),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<Report<AuthClientError>> for ApiError {
    fn from(report: Report<AuthClientError>) -> Self {
        match report.current_context() {
            AuthClientError::InvalidInput { reason } => Self::BadRequest {
                message: reason.clone(),
            },
            AuthClientError::Transport { .. } => Self::Unreachable {
                details: report.to_string(),
            },
            AuthClientError::Configuration { .. } => Self::Internal {
                details: report.to_string(),
            },
            error @ (AuthClientError::InvalidResponse { .. }
            | AuthClientError::Rejected { .. }
            | AuthClientError::SessionRejected { .. }) => Self::Upstream {
                status: error.status().unwrap_or(502),
                message: error.user_message(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::BadRequest { message }
            | Self::Unauthorized { message }
            | Self::Upstream { message, .. } => message,
            Self::Unreachable { details } => {
                tracing::warn!(details = %details, "auth service unreachable");
                UNREACHABLE_MESSAGE.to_string()
            }
            Self::Internal { details } => {
                tracing::error!(details = %details, "internal error");
                "Internal server error".to_string()
            }
        };

        (status, Json(json!({ "success": false, "error": message }))).into_response()
    }
}
