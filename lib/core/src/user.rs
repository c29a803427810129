//! User identity as reported by the Auth Service.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::session::SessionToken;

/// Identifier assigned to a user by the Auth Service.
///
/// The Auth Service issues numeric ids; they are kept as strings so the
/// portal never depends on their representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user id from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An authenticated user.
///
/// Lives as long as the authentication context that holds it; cleared on
/// logout or when the session is found to be invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<SessionToken>,
}

impl User {
    /// Creates a user with only the required fields.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
            username: None,
            name: None,
            avatar_url: None,
            token: None,
        }
    }

    /// Sets the username.
    #[must_use]
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
        self
    }

    /// Sets the session token the user was issued with.
    #[must_use]
    pub fn with_token(mut self, token: Option<SessionToken>) -> Self {
        self.token = token;
        self
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    /// Returns the session token the user was issued with, if known.
    #[must_use]
    pub fn token(&self) -> Option<&SessionToken> {
        self.token.as_ref()
    }

    /// Name to show for this user: display name, then username, then email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.username.as_deref())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_in_order() {
        let user = User::new(UserId::new("1"), "a@b.com");
        assert_eq!(user.display_name(), "a@b.com");

        let user = user.with_username(Some("alice".to_string()));
        assert_eq!(user.display_name(), "alice");

        let user = user.with_name(Some("Alice".to_string()));
        assert_eq!(user.display_name(), "Alice");
    }

    #[test]
    fn serializes_with_camel_case_and_skips_missing_fields() {
        let user = User::new(UserId::new("42"), "a@b.com")
            .with_avatar_url(Some("https://cdn/a.png".to_string()));
        let json = serde_json::to_value(&user).expect("serialize");

        assert_eq!(json["id"], "42");
        assert_eq!(json["avatarUrl"], "https://cdn/a.png");
        assert!(json.get("username").is_none());
        assert!(json.get("token").is_none());
    }

    #[test]
    fn deserializes_from_session_payload() {
        let user: User = serde_json::from_value(serde_json::json!({
            "id": "7",
            "email": "x@y.z",
            "username": "xy",
            "name": "xy",
            "token": "tok"
        }))
        .expect("deserialize");

        assert_eq!(user.id().as_str(), "7");
        assert_eq!(user.token().map(SessionToken::as_str), Some("tok"));
    }
}
