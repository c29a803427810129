//! Session facade and OAuth2 callback routes.

use area_portal_auth_client::CallbackOptions;
use area_portal_core::{SessionStatus, SessionToken};
use area_portal_session::validate;
use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{AppState, OptionalSession};
use crate::error::ApiError;

const MISSING_TOKEN_MESSAGE: &str = "Missing token.";

/// Reports the current session.
///
/// A token the Auth Service rejects is cleared from the cookie and the
/// rejection reason is returned alongside `authenticated: false`.
#[instrument(skip_all)]
pub async fn session_status(
    State(state): State<Arc<AppState>>,
    OptionalSession(token): OptionalSession,
    jar: CookieJar,
) -> Response {
    let Some(token) = token else {
        return Json(SessionStatus::anonymous()).into_response();
    };

    match state.auth_client.fetch_authenticated_user(&token).await {
        Ok(user) => Json(SessionStatus::authenticated(token, user)).into_response(),
        Err(e) if e.current_context().is_transport() => {
            warn!(error = %e, "session lookup unreachable");
            (
                StatusCode::BAD_GATEWAY,
                Json(SessionStatus::invalidated(e.current_context().user_message())),
            )
                .into_response()
        }
        Err(e) => {
            info!(error = %e, "clearing rejected session");
            let jar = state.cookies.clear(jar);
            (
                jar,
                (
                    StatusCode::UNAUTHORIZED,
                    Json(SessionStatus::invalidated(e.current_context().user_message())),
                ),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PersistBody {
    #[serde(default)]
    token: Option<String>,
}

/// Stores a session token in the cookie.
#[instrument(skip_all)]
pub async fn persist_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Result<Json<PersistBody>, JsonRejection>,
) -> Result<(CookieJar, Json<serde_json::Value>), ApiError> {
    let token = body
        .ok()
        .and_then(|Json(body)| body.token)
        .and_then(SessionToken::new)
        .ok_or_else(|| ApiError::bad_request(MISSING_TOKEN_MESSAGE))?;

    debug!("session persisted");
    Ok((state.cookies.set(jar, &token), Json(json!({ "success": true }))))
}

/// Clears the session cookie. Idempotent.
pub async fn clear_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    (state.cookies.clear(jar), Json(json!({ "success": true })))
}

/// Handles the provider redirect.
///
/// The query is validated before any exchange: a provider `error` wins over
/// everything else, then `code`, then `state`. A login flow stores the
/// issued session; a link flow leaves the cookie untouched. Both end in a
/// full navigation to the post-login destination.
#[instrument(skip_all)]
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
    jar: CookieJar,
) -> Response {
    let payload = match validate(&params) {
        Ok(payload) => payload,
        Err(e) => {
            info!(error = %e, "rejected oauth callback");
            return login_redirect(&state, e.user_message()).into_response();
        }
    };

    match state
        .auth_client
        .exchange_oauth_callback(payload, CallbackOptions::default())
        .await
    {
        Ok(response) => {
            let jar = match response.application_token() {
                Some(token) => state.cookies.set(jar, token),
                None => jar,
            };
            info!(
                provider = %response.grant().provider,
                issued_session = response.application_token().is_some(),
                "oauth callback completed"
            );
            (jar, Redirect::to(&state.routes.post_login_redirect)).into_response()
        }
        Err(e) => {
            warn!(error = %e, "oauth callback exchange failed");
            login_redirect(&state, &e.current_context().user_message()).into_response()
        }
    }
}

/// Redirect to the login route carrying `message` as the `error` parameter.
fn login_redirect(state: &AppState, message: &str) -> Redirect {
    let login_route = &state.routes.login_route;
    let target = Url::parse(&state.public_origin)
        .and_then(|origin| origin.join(login_route))
        .map(|mut url| {
            url.query_pairs_mut().append_pair("error", message);
            match url.query() {
                Some(query) => format!("{}?{}", url.path(), query),
                None => url.path().to_string(),
            }
        })
        .unwrap_or_else(|_| login_route.clone());
    Redirect::to(&target)
}
