//! Auth Service HTTP client.

use std::sync::Arc;

use area_portal_core::{ProviderStatus, SessionToken, User, UserId};
use reqwest::header::AUTHORIZATION;
use rootcause::prelude::Report;
use serde_json::json;
use tracing::{debug, instrument, warn};

use crate::config::AuthServiceConfig;
use crate::error::AuthClientError;
use crate::types::{
    AuthorizeMode, AuthorizeOptions, AuthorizeRequest, CallbackOptions, OAuthAuthorizeUrl,
    OAuthCallbackPayload, OAuthCallbackResponse, UpstreamReply, authenticated_user_from_reply,
    provider_statuses_from_reply,
};

/// Platform reported to the Auth Service when the caller does not set one.
pub const DEFAULT_PLATFORM: &str = "web";

/// Message for a link-mode authorize request made without a session.
pub const LINK_REQUIRES_TOKEN_MESSAGE: &str = "Missing token for OAuth2 connection.";

/// Typed client for the remote Auth Service.
///
/// Cheap to clone; clones share the underlying connection pool. No call is
/// ever retried.
#[derive(Debug, Clone)]
pub struct AuthServiceClient {
    http: reqwest::Client,
    base_url: String,
    known_providers: Arc<[String]>,
}

impl AuthServiceClient {
    /// Creates a client from configuration.
    ///
    /// Redirects are never followed so that upstream statuses reach the
    /// caller verbatim.
    pub fn new(config: &AuthServiceConfig) -> Result<Self, Report<AuthClientError>> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthClientError::Configuration {
                details: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
            known_providers: config.known_providers().into(),
        })
    }

    /// Returns the normalized Auth Service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Providers assumed to exist when the per-user lookup fails.
    pub fn known_providers(&self) -> &[String] {
        &self.known_providers
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<UpstreamReply, Report<AuthClientError>> {
        let response = request
            .send()
            .await
            .map_err(|e| AuthClientError::Transport {
                details: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| AuthClientError::Transport {
                details: format!("failed to read response body: {}", e),
            })?;

        Ok(UpstreamReply {
            status,
            body: serde_json::from_slice(&bytes).ok(),
        })
    }

    /// Forwards a credential login. The upstream status is returned verbatim.
    #[instrument(skip(self, password))]
    pub async fn authenticate_with_credentials(
        &self,
        email_or_username: &str,
        password: &str,
    ) -> Result<UpstreamReply, Report<AuthClientError>> {
        let request = self.http.post(self.endpoint("/auth/login")).json(&json!({
            "emailOrUsername": email_or_username,
            "password": password,
        }));
        let reply = self.send(request).await?;
        debug!(status = reply.status, "login answered");
        Ok(reply)
    }

    /// Forwards a registration. The Auth Service signals 409 on conflict and
    /// 400 on a password that is too short.
    #[instrument(skip(self, password))]
    pub async fn register_with_credentials(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<UpstreamReply, Report<AuthClientError>> {
        let request = self
            .http
            .post(self.endpoint("/auth/register"))
            .json(&json!({
                "email": email,
                "username": username,
                "password": password,
            }));
        let reply = self.send(request).await?;
        debug!(status = reply.status, "register answered");
        Ok(reply)
    }

    /// Requests an authorize URL for `provider`.
    ///
    /// Link mode without a token fails before any request is made.
    #[instrument(skip(self, options), fields(mode = options.mode.as_str()))]
    pub async fn fetch_oauth_authorize_url(
        &self,
        provider: &str,
        options: AuthorizeOptions,
    ) -> Result<OAuthAuthorizeUrl, Report<AuthClientError>> {
        if options.mode == AuthorizeMode::Link && options.token.is_none() {
            return Err(AuthClientError::InvalidInput {
                reason: LINK_REQUIRES_TOKEN_MESSAGE.to_string(),
            }
            .into());
        }

        let request = AuthorizeRequest {
            provider: provider.to_string(),
            mode: options.mode,
            callback_url: options.callback_url,
            platform: Some(
                options
                    .platform
                    .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            ),
        };
        let authorization = options.token.as_ref().map(SessionToken::bearer);

        let reply = self
            .proxy_oauth_authorize(&request, authorization.as_deref())
            .await?;
        Ok(OAuthAuthorizeUrl::from_reply(&reply, provider)?)
    }

    /// Sends an authorize request and returns the raw reply.
    ///
    /// `authorization` is forwarded verbatim as the `Authorization` header.
    #[instrument(skip(self, request, authorization), fields(provider = %request.provider, mode = request.mode.as_str()))]
    pub async fn proxy_oauth_authorize(
        &self,
        request: &AuthorizeRequest,
        authorization: Option<&str>,
    ) -> Result<UpstreamReply, Report<AuthClientError>> {
        let mut builder = self
            .http
            .get(self.endpoint(request.mode.upstream_path()))
            .query(&request.query_pairs());
        if let Some(authorization) = authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let reply = self.send(builder).await?;
        debug!(status = reply.status, "authorize answered");
        Ok(reply)
    }

    /// Exchanges a callback code.
    ///
    /// The returned provider access token is never a session token; only
    /// [`OAuthCallbackResponse::application_token`] is.
    #[instrument(skip(self, payload, options))]
    pub async fn exchange_oauth_callback(
        &self,
        payload: OAuthCallbackPayload,
        options: CallbackOptions,
    ) -> Result<OAuthCallbackResponse, Report<AuthClientError>> {
        let mut query = vec![
            ("code", payload.code.secret().clone()),
            ("state", payload.state.secret().clone()),
        ];
        if let Some(callback_url) = options.callback_url.filter(|url| !url.is_empty()) {
            query.push(("redirect_uri", callback_url));
        }

        let request = self
            .http
            .get(self.endpoint("/oauth2/callback"))
            .query(&query);
        let reply = self.send(request).await?;
        let response = OAuthCallbackResponse::from_reply(&reply)?;

        debug!(
            status = reply.status,
            provider = %response.grant().provider,
            issued_session = response.application_token().is_some(),
            "callback exchanged"
        );
        Ok(response)
    }

    /// Looks up the user behind `token`.
    ///
    /// Any non-success answer is [`AuthClientError::SessionRejected`].
    #[instrument(skip_all)]
    pub async fn fetch_authenticated_user(
        &self,
        token: &SessionToken,
    ) -> Result<User, Report<AuthClientError>> {
        let request = self
            .http
            .get(self.endpoint("/auth/me"))
            .header(AUTHORIZATION, token.bearer());
        let reply = self.send(request).await?;
        Ok(authenticated_user_from_reply(&reply, token)?)
    }

    /// Lists the providers the Auth Service supports. Returned verbatim.
    #[instrument(skip_all)]
    pub async fn list_providers(
        &self,
        authorization: Option<&str>,
    ) -> Result<UpstreamReply, Report<AuthClientError>> {
        let mut builder = self.http.get(self.endpoint("/oauth2/providers"));
        if let Some(authorization) = authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }
        self.send(builder).await
    }

    /// Returns the connection status of every provider for `user_id`.
    ///
    /// Never fails: when the lookup does, every known provider is reported
    /// as disconnected.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn fetch_user_providers(
        &self,
        user_id: &UserId,
        token: Option<&SessionToken>,
    ) -> Vec<ProviderStatus> {
        let mut builder = self
            .http
            .get(self.endpoint(&format!("/oauth2/providers/{}", user_id)));
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, token.bearer());
        }

        let statuses = match self.send(builder).await {
            Ok(reply) => provider_statuses_from_reply(&reply),
            Err(e) => {
                warn!(error = %e, "provider status lookup unreachable");
                None
            }
        };

        statuses.unwrap_or_else(|| {
            warn!("falling back to known providers as disconnected");
            self.known_providers
                .iter()
                .map(ProviderStatus::disconnected)
                .collect()
        })
    }

    /// Ends the session on the Auth Service side.
    ///
    /// The Auth Service keeps no server-side session state, so there is
    /// nothing to revoke remotely.
    #[instrument(skip_all)]
    pub async fn logout(&self, _token: Option<&SessionToken>) -> Result<(), Report<AuthClientError>> {
        debug!("auth service logout is local");
        Ok(())
    }
}
