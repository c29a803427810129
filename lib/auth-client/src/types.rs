//! Request and response types for the Auth Service.
//!
//! The Auth Service wraps every payload in `{success, data?, error?}` and
//! fills `data` differently per flow. Each endpoint gets its own decoded
//! type here so that a response missing a field its flow requires is a
//! failure at the boundary, not a `None` discovered later.

use area_portal_core::{ProviderStatus, SessionToken, User, UserId};
use oauth2::{AccessToken, AuthorizationCode, CsrfToken};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::AuthClientError;

/// Message used when an upstream body cannot be decoded.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid server response.";

/// Raw upstream status and body, relayed verbatim by proxy routes.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: u16,
    /// `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

impl UpstreamReply {
    /// Returns true for a 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns the body, substituting a failure envelope when it was unreadable.
    #[must_use]
    pub fn body_or_invalid(&self) -> Value {
        self.body.clone().unwrap_or_else(|| {
            serde_json::json!({ "success": false, "error": INVALID_RESPONSE_MESSAGE })
        })
    }

    /// Decodes the body as a credential login/register response.
    #[must_use]
    pub fn credential(&self) -> CredentialResponse {
        CredentialResponse::from_body(self.body.as_ref())
    }
}

/// The `{success, data, error}` wrapper around every Auth Service payload.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<Value>,
}

impl<T> Envelope<T> {
    fn error_message(&self) -> Option<String> {
        match &self.error {
            Some(Value::String(message)) if !message.is_empty() => Some(message.clone()),
            Some(Value::Null) | None => None,
            Some(Value::String(_)) => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

fn decode_envelope<T: DeserializeOwned>(body: Option<&Value>) -> Option<Envelope<T>> {
    serde_json::from_value(body?.clone()).ok()
}

/// User record as the Auth Service serializes it.
#[derive(Debug, Clone, Deserialize)]
struct BackendUser {
    #[serde(deserialize_with = "id_as_string")]
    id: String,
    email: String,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    avatar_url: Option<String>,
}

impl BackendUser {
    fn into_user(self, token: Option<SessionToken>) -> User {
        User::new(UserId::new(self.id), self.email)
            .with_name(self.username.clone())
            .with_username(self.username)
            .with_avatar_url(self.avatar_url)
            .with_token(token)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match RawId::deserialize(deserializer)? {
        RawId::Number(n) => n.to_string(),
        RawId::Text(s) => s,
    })
}

/// Outcome of a credential login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialResponse {
    /// The Auth Service issued a session.
    Authenticated { user: User, token: SessionToken },
    /// The Auth Service refused, or answered with something unusable.
    Rejected { message: String },
}

#[derive(Deserialize)]
struct CredentialData {
    user: BackendUser,
    token: String,
}

impl CredentialResponse {
    /// Decodes a credential response body.
    #[must_use]
    pub fn from_body(body: Option<&Value>) -> Self {
        let Some(envelope) = decode_envelope::<CredentialData>(body) else {
            return Self::Rejected {
                message: INVALID_RESPONSE_MESSAGE.to_string(),
            };
        };

        if !envelope.success {
            return Self::Rejected {
                message: envelope
                    .error_message()
                    .unwrap_or_else(|| "Unable to authenticate.".to_string()),
            };
        }

        let issued = envelope
            .data
            .and_then(|data| SessionToken::new(data.token).map(|token| (data.user, token)));

        match issued {
            Some((user, token)) => Self::Authenticated {
                user: user.into_user(Some(token.clone())),
                token,
            },
            None => Self::Rejected {
                message: INVALID_RESPONSE_MESSAGE.to_string(),
            },
        }
    }
}

/// Which OAuth2 authorization path to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizeMode {
    /// Establish a new session through the provider.
    #[default]
    Login,
    /// Attach the provider to an existing session. Requires a token.
    #[serde(alias = "connect")]
    Link,
}

impl AuthorizeMode {
    /// Parses a query-string mode; anything other than `link`/`connect` is a login.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("link") | Some("connect") => Self::Link,
            _ => Self::Login,
        }
    }

    /// Upstream path serving this mode.
    #[must_use]
    pub fn upstream_path(&self) -> &'static str {
        match self {
            Self::Login => "/auth/oauth2/login",
            Self::Link => "/auth/oauth2/authorize",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Link => "link",
        }
    }
}

/// Options for requesting an authorize URL.
#[derive(Debug, Clone, Default)]
pub struct AuthorizeOptions {
    /// Existing session token; mandatory for [`AuthorizeMode::Link`].
    pub token: Option<SessionToken>,
    pub mode: AuthorizeMode,
    /// Client platform. Defaults to `web`.
    pub platform: Option<String>,
    pub callback_url: Option<String>,
}

/// An authorize request as sent upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizeRequest {
    pub provider: String,
    pub mode: AuthorizeMode,
    pub callback_url: Option<String>,
    pub platform: Option<String>,
}

impl AuthorizeRequest {
    /// Query parameters for the upstream call; empty values are omitted.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("provider", self.provider.clone())];
        if let Some(callback_url) = self.callback_url.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("callback_url", callback_url.to_string()));
        }
        if let Some(platform) = self.platform.as_deref().filter(|v| !v.is_empty()) {
            pairs.push(("platform", platform.to_string()));
        }
        pairs
    }
}

/// Authorize URL returned by the Auth Service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthAuthorizeUrl {
    pub auth_url: String,
    pub provider: String,
}

#[derive(Deserialize)]
struct AuthorizeData {
    #[serde(default)]
    auth_url: Option<String>,
    #[serde(default)]
    provider: Option<String>,
}

impl OAuthAuthorizeUrl {
    /// Decodes an authorize reply. `provider` defaults to the one requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply is not a success carrying `auth_url`.
    pub fn from_reply(reply: &UpstreamReply, requested: &str) -> Result<Self, AuthClientError> {
        let envelope = decode_envelope::<AuthorizeData>(reply.body.as_ref()).ok_or_else(|| {
            AuthClientError::InvalidResponse {
                status: reply.status,
                details: "authorize response is not an envelope".to_string(),
            }
        })?;

        let message = envelope.error_message();
        match envelope.data {
            Some(AuthorizeData {
                auth_url: Some(auth_url),
                provider,
            }) if envelope.success && !auth_url.is_empty() => Ok(Self {
                auth_url,
                provider: provider.unwrap_or_else(|| requested.to_string()),
            }),
            _ => Err(AuthClientError::Rejected {
                status: reply.status,
                message: message.unwrap_or_else(|| {
                    "Unable to retrieve the OAuth2 authorization URL.".to_string()
                }),
            }),
        }
    }
}

/// Parameters received on the OAuth2 callback redirect.
///
/// Consumed exactly once per callback visit.
#[derive(Debug, Clone)]
pub struct OAuthCallbackPayload {
    pub code: AuthorizationCode,
    pub state: CsrfToken,
}

impl OAuthCallbackPayload {
    #[must_use]
    pub fn new(code: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            code: AuthorizationCode::new(code.into()),
            state: CsrfToken::new(state.into()),
        }
    }
}

/// Options for the callback exchange.
#[derive(Debug, Clone, Default)]
pub struct CallbackOptions {
    /// Forwarded as `redirect_uri` when set.
    pub callback_url: Option<String>,
}

/// Third-party grant obtained during the callback exchange.
///
/// `access_token` belongs to the provider, not to this application, and is
/// never stored as the session.
#[derive(Debug, Clone)]
pub struct ProviderGrant {
    pub provider: String,
    pub user_info: Value,
    pub access_token: AccessToken,
    pub token_type: String,
    pub expires_in: u64,
}

/// Decoded callback exchange result, tagged by flow.
#[derive(Debug, Clone)]
pub enum OAuthCallbackResponse {
    /// Login flow: the Auth Service also issued an application session.
    Login {
        grant: ProviderGrant,
        token: SessionToken,
        user: Option<User>,
    },
    /// Link flow: the provider was attached to an existing account.
    Link { grant: ProviderGrant },
}

#[derive(Deserialize)]
struct CallbackData {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    user_info: Option<Value>,
    #[serde(default)]
    access_token: Option<AccessToken>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<BackendUser>,
}

impl OAuthCallbackResponse {
    /// Decodes a callback exchange reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the reply is not a success carrying `access_token`.
    pub fn from_reply(reply: &UpstreamReply) -> Result<Self, AuthClientError> {
        let envelope = decode_envelope::<CallbackData>(reply.body.as_ref()).ok_or_else(|| {
            AuthClientError::InvalidResponse {
                status: reply.status,
                details: "callback response is not an envelope".to_string(),
            }
        })?;

        let rejected = |message: Option<String>| AuthClientError::Rejected {
            status: reply.status,
            message: message
                .unwrap_or_else(|| "Unable to complete OAuth2 authentication.".to_string()),
        };

        let message = envelope.error_message();
        let success = envelope.success;
        let Some(CallbackData {
            provider,
            user_info,
            access_token: Some(access_token),
            token_type,
            expires_in,
            token,
            user,
        }) = envelope.data.filter(|_| success)
        else {
            return Err(rejected(message));
        };

        let grant = ProviderGrant {
            provider: provider.unwrap_or_else(|| "unknown".to_string()),
            user_info: user_info.unwrap_or_else(|| Value::Object(Default::default())),
            access_token,
            token_type: token_type.unwrap_or_else(|| "Bearer".to_string()),
            expires_in: expires_in.and_then(|v| u64::try_from(v).ok()).unwrap_or(0),
        };

        Ok(match token.and_then(SessionToken::new) {
            Some(token) => Self::Login {
                user: user.map(|u| u.into_user(Some(token.clone()))),
                token,
                grant,
            },
            None => Self::Link { grant },
        })
    }

    /// The application session token, present only for the login flow.
    #[must_use]
    pub fn application_token(&self) -> Option<&SessionToken> {
        match self {
            Self::Login { token, .. } => Some(token),
            Self::Link { .. } => None,
        }
    }

    #[must_use]
    pub fn grant(&self) -> &ProviderGrant {
        match self {
            Self::Login { grant, .. } | Self::Link { grant } => grant,
        }
    }
}

#[derive(Deserialize)]
struct MeData {
    #[serde(default)]
    user: Option<BackendUser>,
}

/// Decodes an `/auth/me` reply into the user behind `token`.
pub(crate) fn authenticated_user_from_reply(
    reply: &UpstreamReply,
    token: &SessionToken,
) -> Result<User, AuthClientError> {
    let envelope = decode_envelope::<MeData>(reply.body.as_ref());
    let message = envelope.as_ref().and_then(Envelope::error_message);

    match envelope {
        Some(Envelope {
            success: true,
            data: Some(MeData { user: Some(user) }),
            ..
        }) if reply.is_success() => Ok(user.into_user(Some(token.clone()))),
        _ => Err(AuthClientError::SessionRejected {
            status: reply.status,
            message: message.unwrap_or_else(|| "Invalid session.".to_string()),
        }),
    }
}

#[derive(Deserialize)]
struct ProvidersData {
    #[serde(default)]
    providers: Option<Vec<ProviderStatus>>,
}

/// Decodes a per-user provider status reply. `None` on any failure.
pub(crate) fn provider_statuses_from_reply(reply: &UpstreamReply) -> Option<Vec<ProviderStatus>> {
    if !reply.is_success() {
        return None;
    }
    let envelope = decode_envelope::<ProvidersData>(reply.body.as_ref())?;
    if !envelope.success {
        return None;
    }
    envelope.data?.providers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(status: u16, body: Value) -> UpstreamReply {
        UpstreamReply {
            status,
            body: Some(body),
        }
    }

    #[test]
    fn credential_success_maps_numeric_id_and_username() {
        let response = CredentialResponse::from_body(Some(&json!({
            "success": true,
            "data": {
                "user": { "id": 12, "email": "a@b.com", "username": "ab" },
                "token": "jwt-1"
            }
        })));

        let CredentialResponse::Authenticated { user, token } = response else {
            panic!("expected authenticated response");
        };
        assert_eq!(token.as_str(), "jwt-1");
        assert_eq!(user.id().as_str(), "12");
        assert_eq!(user.name(), Some("ab"));
        assert_eq!(user.token(), Some(&token));
    }

    #[test]
    fn credential_failure_keeps_upstream_message() {
        let response = CredentialResponse::from_body(Some(&json!({
            "success": false,
            "error": "invalid credentials"
        })));
        assert_eq!(
            response,
            CredentialResponse::Rejected {
                message: "invalid credentials".to_string()
            }
        );
    }

    #[test]
    fn credential_success_without_token_is_rejected() {
        let response = CredentialResponse::from_body(Some(&json!({
            "success": true,
            "data": { "user": { "id": "1", "email": "a@b.com" }, "token": "" }
        })));
        assert!(matches!(response, CredentialResponse::Rejected { .. }));

        let response = CredentialResponse::from_body(None);
        assert_eq!(
            response,
            CredentialResponse::Rejected {
                message: INVALID_RESPONSE_MESSAGE.to_string()
            }
        );
    }

    #[test]
    fn authorize_mode_parsing_defaults_to_login() {
        assert_eq!(AuthorizeMode::from_query(None), AuthorizeMode::Login);
        assert_eq!(AuthorizeMode::from_query(Some("login")), AuthorizeMode::Login);
        assert_eq!(AuthorizeMode::from_query(Some("bogus")), AuthorizeMode::Login);
        assert_eq!(AuthorizeMode::from_query(Some("link")), AuthorizeMode::Link);
        assert_eq!(AuthorizeMode::from_query(Some("connect")), AuthorizeMode::Link);
        assert_eq!(AuthorizeMode::Link.upstream_path(), "/auth/oauth2/authorize");
    }

    #[test]
    fn authorize_request_omits_empty_parameters() {
        let request = AuthorizeRequest {
            provider: "google".to_string(),
            mode: AuthorizeMode::Login,
            callback_url: Some(String::new()),
            platform: Some("web".to_string()),
        };
        assert_eq!(
            request.query_pairs(),
            vec![
                ("provider", "google".to_string()),
                ("platform", "web".to_string())
            ]
        );
    }

    #[test]
    fn authorize_url_defaults_provider_to_requested() {
        let url = OAuthAuthorizeUrl::from_reply(
            &reply(200, json!({ "success": true, "data": { "auth_url": "https://idp/auth" } })),
            "github",
        )
        .expect("authorize url");
        assert_eq!(url.provider, "github");
        assert_eq!(url.auth_url, "https://idp/auth");
    }

    #[test]
    fn authorize_url_failure_carries_upstream_error() {
        let err = OAuthAuthorizeUrl::from_reply(
            &reply(400, json!({ "success": false, "error": "unknown provider" })),
            "nope",
        )
        .expect_err("should fail");
        assert_eq!(
            err,
            AuthClientError::Rejected {
                status: 400,
                message: "unknown provider".to_string()
            }
        );
    }

    #[test]
    fn callback_with_token_is_login_flow() {
        let response = OAuthCallbackResponse::from_reply(&reply(
            200,
            json!({
                "success": true,
                "data": {
                    "provider": "google",
                    "access_token": "provider-secret",
                    "token": "app-session",
                    "user": { "id": 3, "email": "g@x.com", "username": "g" }
                }
            }),
        ))
        .expect("callback");

        assert_eq!(
            response.application_token().map(SessionToken::as_str),
            Some("app-session")
        );
        assert_eq!(response.grant().access_token.secret(), "provider-secret");
        assert_eq!(response.grant().token_type, "Bearer");
        assert_eq!(response.grant().expires_in, 0);
        assert!(matches!(response, OAuthCallbackResponse::Login { user: Some(_), .. }));
    }

    #[test]
    fn callback_without_token_is_link_flow() {
        let response = OAuthCallbackResponse::from_reply(&reply(
            200,
            json!({
                "success": true,
                "data": { "access_token": "provider-secret", "expires_in": 3600 }
            }),
        ))
        .expect("callback");

        assert!(response.application_token().is_none());
        assert_eq!(response.grant().provider, "unknown");
        assert_eq!(response.grant().expires_in, 3600);
        assert_eq!(response.grant().user_info, json!({}));
    }

    #[test]
    fn callback_without_access_token_fails() {
        let err = OAuthCallbackResponse::from_reply(&reply(
            200,
            json!({ "success": true, "data": { "token": "app-session" } }),
        ))
        .expect_err("should fail");
        assert!(matches!(err, AuthClientError::Rejected { status: 200, .. }));
    }

    #[test]
    fn callback_payload_debug_is_redacted() {
        let payload = OAuthCallbackPayload::new("the-code", "the-state");
        let debug = format!("{payload:?}");
        assert!(!debug.contains("the-code"));
        assert!(!debug.contains("the-state"));
    }

    #[test]
    fn me_failure_is_session_rejection() {
        let token = SessionToken::new("stale").expect("token");
        let err = authenticated_user_from_reply(
            &reply(401, json!({ "success": false, "error": "invalid or expired token" })),
            &token,
        )
        .expect_err("should fail");
        assert_eq!(
            err,
            AuthClientError::SessionRejected {
                status: 401,
                message: "invalid or expired token".to_string()
            }
        );
    }

    #[test]
    fn provider_statuses_require_success_envelope() {
        let ok = reply(
            200,
            json!({ "success": true, "data": { "providers": [
                { "provider": "github", "is_logged": true }
            ] } }),
        );
        assert_eq!(provider_statuses_from_reply(&ok).map(|p| p.len()), Some(1));

        let failed = reply(500, json!({ "success": false, "error": "db down" }));
        assert!(provider_statuses_from_reply(&failed).is_none());
    }

    #[test]
    fn non_string_errors_are_stringified() {
        let response = CredentialResponse::from_body(Some(&json!({
            "success": false,
            "error": { "code": 7 }
        })));
        assert_eq!(
            response,
            CredentialResponse::Rejected {
                message: "{\"code\":7}".to_string()
            }
        );
    }
}
