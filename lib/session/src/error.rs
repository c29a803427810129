//! Error types for the authentication context and its collaborators.
//!
//! Errors are designed for layered context using rootcause:
//! - `ContextError`: an operation could not start
//! - `SessionApiError`: the same-origin session facade failed
//!
//! Failures of an operation that did start are not errors here; they are
//! captured into the `error` field of the resulting state.

use area_portal_core::ErrorReason;
use std::fmt;

/// Errors preventing a context operation from running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// Another operation is still pending; state was not touched.
    Busy { operation: &'static str },
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy { operation } => {
                write!(f, "cannot start {operation}: another operation is pending")
            }
        }
    }
}

impl std::error::Error for ContextError {}

/// Which facade call failed, for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionApiCall {
    Status,
    Persist,
    Clear,
}

/// Errors from the session facade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionApiError {
    /// The facade could not be reached.
    Transport {
        call: SessionApiCall,
        details: String,
    },
    /// The facade answered with a non-success status.
    Rejected { call: SessionApiCall, status: u16 },
    /// The facade answered with a body that is not a session status.
    InvalidResponse { details: String },
    /// The facade could not reach the Auth Service. The cookie was kept.
    Unavailable { message: String },
}

impl SessionApiError {
    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        let call = match self {
            Self::Transport { call, .. } | Self::Rejected { call, .. } => *call,
            Self::Unavailable { message } => return message.clone(),
            Self::InvalidResponse { .. } => SessionApiCall::Status,
        };
        match (self, call) {
            (Self::InvalidResponse { .. }, _) => "Invalid session response.",
            (_, SessionApiCall::Status) => "Unable to retrieve the session.",
            (_, SessionApiCall::Persist) => "Unable to save the session.",
            (_, SessionApiCall::Clear) => "Unable to close the session.",
        }
        .to_string()
    }

    /// Classifies the error for attachment to authentication state.
    #[must_use]
    pub fn reason(&self) -> ErrorReason {
        match self {
            Self::Transport { .. } | Self::Unavailable { .. } => ErrorReason::Network,
            Self::Rejected { .. } => ErrorReason::Server,
            Self::InvalidResponse { .. } => ErrorReason::Unknown,
        }
    }
}

impl fmt::Display for SessionApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { call, details } => {
                write!(f, "session facade unreachable during {call:?}: {details}")
            }
            Self::Rejected { call, status } => {
                write!(f, "session facade rejected {call:?} with status {status}")
            }
            Self::InvalidResponse { details } => {
                write!(f, "invalid session facade response: {details}")
            }
            Self::Unavailable { message } => {
                write!(f, "session facade could not reach the auth service: {message}")
            }
        }
    }
}

impl std::error::Error for SessionApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failed_call() {
        let err = SessionApiError::Rejected {
            call: SessionApiCall::Persist,
            status: 500,
        };
        assert_eq!(err.user_message(), "Unable to save the session.");
        assert_eq!(err.reason(), ErrorReason::Server);

        let err = SessionApiError::Transport {
            call: SessionApiCall::Clear,
            details: "refused".to_string(),
        };
        assert_eq!(err.user_message(), "Unable to close the session.");
        assert_eq!(err.reason(), ErrorReason::Network);
    }

    #[test]
    fn unavailable_keeps_facade_message() {
        let err = SessionApiError::Unavailable {
            message: "Unable to reach the authentication service.".to_string(),
        };
        assert_eq!(
            err.user_message(),
            "Unable to reach the authentication service."
        );
        assert_eq!(err.reason(), ErrorReason::Network);
    }

    #[test]
    fn busy_names_the_rejected_operation() {
        let err = ContextError::Busy {
            operation: "logout",
        };
        assert_eq!(
            err.to_string(),
            "cannot start logout: another operation is pending"
        );
    }
}
