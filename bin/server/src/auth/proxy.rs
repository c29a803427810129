//! Same-origin proxies to the Auth Service.
//!
//! Upstream statuses and bodies are relayed verbatim. Local validation
//! failures answer 400 without calling upstream, and transport failures
//! answer 502 through [`ApiError`].

use area_portal_auth_client::{AuthorizeMode, AuthorizeRequest, UpstreamReply};
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{AppState, RequireSession};
use crate::error::ApiError;

const LOGIN_FIELDS_MESSAGE: &str = "Email or username and password are required.";
const REGISTER_FIELDS_MESSAGE: &str = "Email, username, and password are required.";
const PROVIDER_REQUIRED_MESSAGE: &str = "provider is required";

/// Relays an upstream reply as the response.
fn relay(reply: UpstreamReply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, Json(reply.body_or_invalid())).into_response()
}

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Trimmed value, or `None` when blank.
fn field(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[serde(default)]
    email_or_username: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Forwards a credential login.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<LoginBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let identifier = field(body.email_or_username).or_else(|| field(body.email));
    let (Some(identifier), Some(password)) = (identifier, field(body.password)) else {
        return Err(ApiError::bad_request(LOGIN_FIELDS_MESSAGE));
    };

    let reply = state
        .auth_client
        .authenticate_with_credentials(&identifier, &password)
        .await?;
    Ok(relay(reply))
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterBody {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

/// Forwards a registration. The username falls back to `name`, then `email`.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let email = field(body.email);
    let username = field(body.username)
        .or_else(|| field(body.name))
        .or_else(|| email.clone());
    let (Some(email), Some(username), Some(password)) = (email, username, field(body.password))
    else {
        return Err(ApiError::bad_request(REGISTER_FIELDS_MESSAGE));
    };

    let reply = state
        .auth_client
        .register_with_credentials(&email, &username, &password)
        .await?;
    Ok(relay(reply))
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    #[serde(default)]
    provider: Option<String>,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    callback_url: Option<String>,
    #[serde(default)]
    platform: Option<String>,
}

/// Forwards an authorize request, including the caller's `Authorization`
/// header when present.
#[instrument(skip_all)]
pub async fn authorize(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Response, ApiError> {
    let provider =
        field(query.provider).ok_or_else(|| ApiError::bad_request(PROVIDER_REQUIRED_MESSAGE))?;
    let request = AuthorizeRequest {
        provider,
        mode: AuthorizeMode::from_query(query.mode.as_deref()),
        callback_url: field(query.callback_url),
        platform: field(query.platform),
    };
    debug!(provider = %request.provider, mode = request.mode.as_str(), "proxying authorize");

    let reply = state
        .auth_client
        .proxy_oauth_authorize(&request, authorization(&headers))
        .await?;
    Ok(relay(reply))
}

/// Lists the providers the Auth Service supports.
#[instrument(skip_all)]
pub async fn auth_providers(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let reply = state
        .auth_client
        .list_providers(authorization(&headers))
        .await?;

    if reply.body.is_none() && !reply.is_success() {
        let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::BAD_GATEWAY);
        return Ok((status, Json(json!({ "error": "Upstream error" }))).into_response());
    }
    Ok(relay(reply))
}

/// Connection status of every provider for the signed-in user.
///
/// Falls back to the known providers, all disconnected, when the lookup fails.
#[instrument(skip_all)]
pub async fn user_providers(
    State(state): State<Arc<AppState>>,
    RequireSession(session): RequireSession,
) -> Json<serde_json::Value> {
    let providers = state
        .auth_client
        .fetch_user_providers(session.user.id(), Some(&session.token))
        .await;
    Json(json!({ "success": true, "data": { "providers": providers } }))
}
