//! Session token and the client-held session record.
//!
//! The session is a single opaque bearer token issued by the Auth Service.
//! The server mirrors it in the `session` cookie; the client-side
//! authentication context is the only owner of the in-memory copy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::user::User;

/// Opaque bearer token identifying an application session.
///
/// Only tokens issued by the Auth Service for this application belong here.
/// Third-party provider access tokens use a different type and can never be
/// converted into a `SessionToken`.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionToken(String);

impl SessionToken {
    /// Creates a token, rejecting empty or whitespace-only values.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Returns the raw token value.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Formats the token as an `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

/// Rejection of an empty token during deserialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyToken;

impl fmt::Display for EmptyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session token is empty")
    }
}

impl std::error::Error for EmptyToken {}

impl TryFrom<String> for SessionToken {
    type Error = EmptyToken;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(EmptyToken)
    }
}

impl From<SessionToken> for String {
    fn from(token: SessionToken) -> Self {
        token.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken([redacted])")
    }
}

/// Session as held by the client: a token, or nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    token: Option<SessionToken>,
}

impl Session {
    /// A session with no token.
    #[must_use]
    pub fn empty() -> Self {
        Self { token: None }
    }

    /// A session holding the given token.
    #[must_use]
    pub fn with_token(token: SessionToken) -> Self {
        Self { token: Some(token) }
    }

    /// Returns the token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Returns true if a token is held.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }
}

impl From<Option<SessionToken>> for Session {
    fn from(token: Option<SessionToken>) -> Self {
        Self { token }
    }
}

/// Body of the session facade's status endpoint.
///
/// `authenticated` is true only when both `token` and `user` are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStatus {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub token: Option<SessionToken>,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionStatus {
    /// No session.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// No session, with the reason the previous one was dropped.
    #[must_use]
    pub fn invalidated(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// A validated session.
    #[must_use]
    pub fn authenticated(token: SessionToken, user: User) -> Self {
        Self {
            authenticated: true,
            token: Some(token),
            user: Some(user),
            error: None,
        }
    }

    /// Returns the token and user if this status describes a usable session.
    #[must_use]
    pub fn into_session(self) -> Option<(SessionToken, Option<User>)> {
        match (self.authenticated, self.token) {
            (true, Some(token)) => Some((token, self.user)),
            _ => None,
        }
    }
}
