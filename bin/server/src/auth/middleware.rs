//! Session extractors for Axum.

use area_portal_core::{AuthStatus, SessionToken, User};
use area_portal_session::GuardDecision;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::convert::Infallible;
use std::sync::Arc;

use super::AppState;
use crate::error::ApiError;

/// Extractor for the session token, without validating it.
///
/// Reads the cookie store directly; no upstream call.
pub struct OptionalSession(pub Option<SessionToken>);

impl<S> FromRequestParts<S> for OptionalSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(OptionalSession(app_state.cookies.get(&jar)))
    }
}

/// A session the Auth Service has confirmed.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub token: SessionToken,
    pub user: User,
}

/// Extractor for requiring a valid session.
///
/// API paths are rejected with 401; other protected paths redirect to the
/// login route. A token the Auth Service rejects is cleared.
pub struct RequireSession(pub AuthenticatedSession);

impl<S> FromRequestParts<S> for RequireSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let path = parts.uri.path();
        let redirect_to = if path.starts_with("/api/") {
            None
        } else {
            match app_state
                .guard
                .decide(Some(path), AuthStatus::Unauthenticated)
            {
                GuardDecision::Redirect(to) => Some(to),
                GuardDecision::Render | GuardDecision::Loading => None,
            }
        };

        let token = app_state
            .cookies
            .get(&jar)
            .ok_or_else(|| AuthRejection::NotAuthenticated {
                redirect_to: redirect_to.clone(),
            })?;

        match app_state.auth_client.fetch_authenticated_user(&token).await {
            Ok(user) => Ok(RequireSession(AuthenticatedSession { token, user })),
            Err(e) if e.current_context().is_transport() => Err(AuthRejection::Unavailable {
                details: e.to_string(),
            }),
            Err(e) => {
                tracing::debug!(error = %e, "session rejected by auth service");
                Err(AuthRejection::SessionExpired {
                    redirect_to,
                    message: e.current_context().user_message(),
                    jar: app_state.cookies.clear(jar),
                })
            }
        }
    }
}

/// Rejection type for session extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated {
        redirect_to: Option<String>,
    },
    SessionExpired {
        redirect_to: Option<String>,
        message: String,
        jar: CookieJar,
    },
    Unavailable {
        details: String,
    },
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated {
                redirect_to: Some(to),
            } => Redirect::to(&to).into_response(),
            Self::NotAuthenticated { redirect_to: None } => ApiError::Unauthorized {
                message: "Not authenticated.".to_string(),
            }
            .into_response(),
            Self::SessionExpired {
                redirect_to: Some(to),
                jar,
                ..
            } => (jar, Redirect::to(&to)).into_response(),
            Self::SessionExpired {
                redirect_to: None,
                message,
                jar,
            } => (jar, ApiError::Unauthorized { message }).into_response(),
            Self::Unavailable { details } => ApiError::Unreachable { details }.into_response(),
        }
    }
}
