//! Client for the same-origin session facade (`/api/session`).

use area_portal_auth_client::error::UNREACHABLE_MESSAGE;
use area_portal_core::{SessionStatus, SessionToken};
use async_trait::async_trait;
use rootcause::prelude::Report;
use serde_json::json;
use tracing::{debug, instrument};

use crate::error::{SessionApiCall, SessionApiError};

/// Path of the session facade, relative to the portal origin.
pub const SESSION_API_PATH: &str = "/api/session";

/// Operations the context needs from the session facade.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Reads the cookie-backed session status.
    async fn fetch_status(&self) -> Result<SessionStatus, Report<SessionApiError>>;

    /// Stores `token` in the session cookie.
    async fn persist(&self, token: &SessionToken) -> Result<(), Report<SessionApiError>>;

    /// Clears the session cookie.
    async fn clear(&self) -> Result<(), Report<SessionApiError>>;
}

/// HTTP implementation of [`SessionApi`].
///
/// Keeps its own cookie jar, so one client behaves like one browser tab.
#[derive(Debug, Clone)]
pub struct SessionApiClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SessionApiClient {
    /// Creates a client for the portal served at `origin`.
    pub fn new(origin: &str) -> Result<Self, Report<SessionApiError>> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| SessionApiError::Transport {
                call: SessionApiCall::Status,
                details: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            endpoint: format!("{}{}", origin.trim_end_matches('/'), SESSION_API_PATH),
        })
    }

    async fn send(
        &self,
        call: SessionApiCall,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, Report<SessionApiError>> {
        let response = request
            .send()
            .await
            .map_err(|e| SessionApiError::Transport {
                call,
                details: e.to_string(),
            })?;
        debug!(status = response.status().as_u16(), ?call, "session facade answered");
        Ok(response)
    }

    fn require_success(
        call: SessionApiCall,
        response: &reqwest::Response,
    ) -> Result<(), Report<SessionApiError>> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SessionApiError::Rejected {
                call,
                status: response.status().as_u16(),
            }
            .into())
        }
    }
}

#[async_trait]
impl SessionApi for SessionApiClient {
    /// The body is read whatever the status: an expired session answers 401
    /// with a valid status body. A 502 means the facade kept the cookie but
    /// could not validate it, and is an error rather than a status.
    #[instrument(skip(self))]
    async fn fetch_status(&self) -> Result<SessionStatus, Report<SessionApiError>> {
        let response = self
            .send(SessionApiCall::Status, self.http.get(&self.endpoint))
            .await?;
        let http_status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SessionApiError::Transport {
                call: SessionApiCall::Status,
                details: e.to_string(),
            })?;
        let parsed = serde_json::from_slice::<SessionStatus>(&bytes);

        if http_status == reqwest::StatusCode::BAD_GATEWAY {
            let message = parsed
                .ok()
                .and_then(|status| status.error)
                .unwrap_or_else(|| UNREACHABLE_MESSAGE.to_string());
            return Err(SessionApiError::Unavailable { message }.into());
        }

        let status = parsed.map_err(|e| SessionApiError::InvalidResponse {
            details: e.to_string(),
        })?;
        Ok(status)
    }

    #[instrument(skip_all)]
    async fn persist(&self, token: &SessionToken) -> Result<(), Report<SessionApiError>> {
        let request = self
            .http
            .post(&self.endpoint)
            .json(&json!({ "token": token.as_str() }));
        let response = self.send(SessionApiCall::Persist, request).await?;
        Self::require_success(SessionApiCall::Persist, &response)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<(), Report<SessionApiError>> {
        let response = self
            .send(SessionApiCall::Clear, self.http.delete(&self.endpoint))
            .await?;
        Self::require_success(SessionApiCall::Clear, &response)
    }
}
