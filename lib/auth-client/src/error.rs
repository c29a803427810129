//! Error types for the Auth Service client.
//!
//! Errors follow the portal's error taxonomy so that callers can map them
//! without inspecting messages:
//! - `InvalidInput`: local precondition failures, no request was sent
//! - `Transport`: the Auth Service could not be reached
//! - `Rejected`: the Auth Service answered with a failure
//! - `SessionRejected`: an authenticated lookup failed, the token is invalid
//! - `InvalidResponse`: the Auth Service answered with something unreadable

use area_portal_core::ErrorReason;
use std::fmt;

/// Message used when the Auth Service cannot be reached.
pub const UNREACHABLE_MESSAGE: &str = "Unable to reach the authentication service.";

/// Errors from Auth Service operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthClientError {
    /// A precondition failed before any request was made.
    InvalidInput { reason: String },
    /// The client could not be constructed.
    Configuration { details: String },
    /// The request failed before a response arrived.
    Transport { details: String },
    /// The Auth Service answered but the body was not understood.
    InvalidResponse { status: u16, details: String },
    /// The Auth Service answered with a failure.
    Rejected { status: u16, message: String },
    /// The authenticated-user lookup failed; the token should be discarded.
    SessionRejected { status: u16, message: String },
}

impl AuthClientError {
    /// Returns the upstream status, when a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidResponse { status, .. }
            | Self::Rejected { status, .. }
            | Self::SessionRejected { status, .. } => Some(*status),
            Self::InvalidInput { .. } | Self::Configuration { .. } | Self::Transport { .. } => None,
        }
    }

    /// Returns true if the Auth Service was never reached.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Classifies the error for attachment to authentication state.
    #[must_use]
    pub fn reason(&self) -> ErrorReason {
        match self {
            Self::Transport { .. } => ErrorReason::Network,
            Self::InvalidResponse { .. } | Self::Rejected { .. } | Self::SessionRejected { .. } => {
                ErrorReason::Server
            }
            Self::InvalidInput { .. } | Self::Configuration { .. } => ErrorReason::Unknown,
        }
    }

    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidInput { reason } => reason.clone(),
            Self::Configuration { .. } => "The authentication client is misconfigured.".to_string(),
            Self::Transport { .. } => UNREACHABLE_MESSAGE.to_string(),
            Self::InvalidResponse { .. } => "Invalid server response.".to_string(),
            Self::Rejected { message, .. } | Self::SessionRejected { message, .. } => {
                message.clone()
            }
        }
    }
}

impl fmt::Display for AuthClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            Self::Configuration { details } => {
                write!(f, "auth client configuration error: {details}")
            }
            Self::Transport { details } => {
                write!(f, "failed to reach auth service: {details}")
            }
            Self::InvalidResponse { status, details } => {
                write!(f, "invalid auth service response (status {status}): {details}")
            }
            Self::Rejected { status, message } => {
                write!(f, "auth service rejected request (status {status}): {message}")
            }
            Self::SessionRejected { status, message } => {
                write!(f, "session rejected (status {status}): {message}")
            }
        }
    }
}

impl std::error::Error for AuthClientError {}
