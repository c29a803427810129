//! User-facing authentication errors.
//!
//! Fallible operations in the other crates return rootcause `Report`s over
//! their own context types. [`AuthError`] is different: it is the value
//! attached to authentication state, not something that is propagated.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad classification of why an authentication operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorReason {
    /// The request never reached a usable response.
    Network,
    /// The Auth Service or session facade answered with a rejection.
    Server,
    /// Anything else, including local precondition failures.
    Unknown,
}

impl fmt::Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Server => write!(f, "server"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Error attached to authentication state.
///
/// Superseded by each new operation; never propagated as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthError {
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<ErrorReason>,
}

impl AuthError {
    /// Creates an error with no classification.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            reason: None,
        }
    }

    /// Creates an error classified with the given reason.
    #[must_use]
    pub fn with_reason(message: impl Into<String>, reason: ErrorReason) -> Self {
        Self {
            message: message.into(),
            reason: Some(reason),
        }
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the classification, if any.
    #[must_use]
    pub fn reason(&self) -> Option<ErrorReason> {
        self.reason
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_display_is_message() {
        let err = AuthError::with_reason("Unable to log in.", ErrorReason::Network);
        assert_eq!(err.to_string(), "Unable to log in.");
        assert_eq!(err.reason(), Some(ErrorReason::Network));
    }

    #[test]
    fn auth_error_serializes_without_empty_reason() {
        let json = serde_json::to_value(AuthError::new("boom")).expect("serialize");
        assert_eq!(json, serde_json::json!({ "message": "boom" }));

        let json = serde_json::to_value(AuthError::with_reason("boom", ErrorReason::Server))
            .expect("serialize");
        assert_eq!(json["reason"], "server");
    }
}
