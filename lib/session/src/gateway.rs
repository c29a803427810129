//! Seams between the authentication context and the outside world.
//!
//! The context never talks to the network or the browser directly. It goes
//! through these traits so that the same state machine drives a real
//! Auth Service in production and recording fakes in tests.

use area_portal_auth_client::{
    AuthClientError, AuthServiceClient, AuthorizeOptions, CallbackOptions, CredentialResponse,
    OAuthAuthorizeUrl, OAuthCallbackPayload, OAuthCallbackResponse,
};
use area_portal_core::SessionToken;
use async_trait::async_trait;
use rootcause::prelude::Report;

/// Operations the context needs from the Auth Service.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Logs in with an email or username and a password.
    async fn login(
        &self,
        email_or_username: &str,
        password: &str,
    ) -> Result<CredentialResponse, Report<AuthClientError>>;

    /// Creates an account and logs it in.
    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<CredentialResponse, Report<AuthClientError>>;

    /// Requests the provider authorize URL.
    async fn authorize_url(
        &self,
        provider: &str,
        options: AuthorizeOptions,
    ) -> Result<OAuthAuthorizeUrl, Report<AuthClientError>>;

    /// Exchanges a callback code. Single use.
    async fn exchange_callback(
        &self,
        payload: OAuthCallbackPayload,
        options: CallbackOptions,
    ) -> Result<OAuthCallbackResponse, Report<AuthClientError>>;

    /// Ends the session on the Auth Service side.
    async fn logout(&self, token: Option<&SessionToken>) -> Result<(), Report<AuthClientError>>;
}

#[async_trait]
impl AuthGateway for AuthServiceClient {
    async fn login(
        &self,
        email_or_username: &str,
        password: &str,
    ) -> Result<CredentialResponse, Report<AuthClientError>> {
        let reply = self
            .authenticate_with_credentials(email_or_username, password)
            .await?;
        Ok(reply.credential())
    }

    async fn register(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<CredentialResponse, Report<AuthClientError>> {
        let reply = self
            .register_with_credentials(email, username, password)
            .await?;
        Ok(reply.credential())
    }

    async fn authorize_url(
        &self,
        provider: &str,
        options: AuthorizeOptions,
    ) -> Result<OAuthAuthorizeUrl, Report<AuthClientError>> {
        self.fetch_oauth_authorize_url(provider, options).await
    }

    async fn exchange_callback(
        &self,
        payload: OAuthCallbackPayload,
        options: CallbackOptions,
    ) -> Result<OAuthCallbackResponse, Report<AuthClientError>> {
        self.exchange_oauth_callback(payload, options).await
    }

    async fn logout(&self, token: Option<&SessionToken>) -> Result<(), Report<AuthClientError>> {
        AuthServiceClient::logout(self, token).await
    }
}

/// Full-page navigation.
///
/// A navigation ends the current page context; nothing observed after it
/// is meaningful to the user.
pub trait Navigator: Send + Sync {
    fn navigate(&self, url: &str);
}
