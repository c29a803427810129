//! The authentication context: one per application root.
//!
//! All mutation goes through the named operations below. Each returns the
//! state it settled on and publishes every intermediate state to
//! subscribers. Only one operation runs at a time; starting another while
//! one is pending fails with [`ContextError::Busy`] and leaves state alone.

use std::sync::Arc;

use area_portal_auth_client::{
    AuthClientError, AuthorizeMode, AuthorizeOptions, CredentialResponse,
};
use area_portal_core::{AuthError, ErrorReason, SessionToken, User};
use rootcause::prelude::Report;
use tokio::sync::{Mutex, MutexGuard, watch};
use tracing::{debug, info, instrument, warn};

use crate::error::{ContextError, SessionApiError};
use crate::facade::SessionApi;
use crate::gateway::{AuthGateway, Navigator};
use crate::state::AuthState;

/// Route the provider sends the user back to after an OAuth2 login.
pub const DEFAULT_POST_LOGIN_PATH: &str = "/area";

/// Message for a link attempt without a session.
pub const LINK_REQUIRES_SESSION_MESSAGE: &str =
    "You must be connected before linking an external service.";

/// Credentials for [`AuthContext::login`].
#[derive(Clone)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

/// Account details for [`AuthContext::register`].
#[derive(Clone)]
pub struct RegisterPayload {
    pub email: String,
    pub password: String,
    /// Used as the username; the email is used when absent.
    pub name: Option<String>,
}

/// Options for [`AuthContext::start_oauth_login`].
#[derive(Debug, Clone, Default)]
pub struct OAuthLoginOptions {
    pub mode: AuthorizeMode,
    pub callback_url: Option<String>,
    pub platform: Option<String>,
}

/// Client-side authentication state and the operations that change it.
pub struct AuthContext {
    gateway: Arc<dyn AuthGateway>,
    session_api: Arc<dyn SessionApi>,
    navigator: Arc<dyn Navigator>,
    origin: String,
    post_login_path: String,
    server_supplied_session: bool,
    state: watch::Sender<AuthState>,
    in_flight: Mutex<()>,
}

impl AuthContext {
    /// Creates an idle context for the portal served at `origin`.
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        session_api: Arc<dyn SessionApi>,
        navigator: Arc<dyn Navigator>,
        origin: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            session_api,
            navigator,
            origin: origin.into().trim_end_matches('/').to_string(),
            post_login_path: DEFAULT_POST_LOGIN_PATH.to_string(),
            server_supplied_session: false,
            state: watch::Sender::new(AuthState::default()),
            in_flight: Mutex::new(()),
        }
    }

    /// Seeds the context with a session the server already resolved.
    ///
    /// With a token the context starts authenticated and [`Self::mount`]
    /// does not query the facade.
    #[must_use]
    pub fn with_initial_session(mut self, token: Option<SessionToken>, user: Option<User>) -> Self {
        self.server_supplied_session = token.is_some();
        self.state.send_replace(AuthState::initial(token, user));
        self
    }

    /// Overrides the path used to build the default OAuth2 login callback URL.
    #[must_use]
    pub fn with_post_login_path(mut self, path: impl Into<String>) -> Self {
        self.post_login_path = path.into();
        self
    }

    /// Current state.
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receives every state the context publishes.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn publish(&self, next: AuthState) -> AuthState {
        debug!(status = %next.status(), "auth state changed");
        self.state.send_replace(next.clone());
        next
    }

    fn begin(&self, operation: &'static str) -> Result<MutexGuard<'_, ()>, Report<ContextError>> {
        match self.in_flight.try_lock() {
            Ok(guard) => Ok(guard),
            Err(_) => {
                debug!(operation, "rejected overlapping auth operation");
                Err(ContextError::Busy { operation }.into())
            }
        }
    }

    fn default_callback_url(&self) -> String {
        format!("{}{}", self.origin, self.post_login_path)
    }

    /// Rehydrates state on page load, unless the server supplied a session.
    pub async fn mount(&self) -> Result<AuthState, Report<ContextError>> {
        if self.server_supplied_session {
            return Ok(self.state());
        }
        self.refresh().await
    }

    /// Re-reads the session from the facade.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<AuthState, Report<ContextError>> {
        let _guard = self.begin("refresh")?;
        let loading = self.publish(self.state().loading());

        let next = match self.session_api.fetch_status().await {
            Ok(status) => {
                let error = status
                    .error
                    .clone()
                    .map(|message| AuthError::with_reason(message, ErrorReason::Server));
                match status.into_session() {
                    Some((token, Some(user))) => AuthState::authenticated(token, Some(user)),
                    _ => AuthState::unauthenticated(error),
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to refresh session");
                loading.failed(facade_error(&e))
            }
        };

        Ok(self.publish(next))
    }

    /// Requests a provider authorize URL and navigates to it.
    ///
    /// Link mode without a session fails locally with no request made.
    #[instrument(skip(self, options), fields(mode = options.mode.as_str()))]
    pub async fn start_oauth_login(
        &self,
        provider: &str,
        options: OAuthLoginOptions,
    ) -> Result<AuthState, Report<ContextError>> {
        let _guard = self.begin("start_oauth_login")?;
        let current = self.state();
        let token = current.token().cloned();

        if options.mode == AuthorizeMode::Link && token.is_none() {
            return Ok(self.publish(current.failed(AuthError::with_reason(
                LINK_REQUIRES_SESSION_MESSAGE,
                ErrorReason::Unknown,
            ))));
        }

        let callback_url = options.callback_url.or_else(|| {
            (options.mode == AuthorizeMode::Login).then(|| self.default_callback_url())
        });
        let loading = self.publish(current.loading());

        let authorize = AuthorizeOptions {
            token,
            mode: options.mode,
            platform: options.platform,
            callback_url,
        };
        match self.gateway.authorize_url(provider, authorize).await {
            Ok(url) => {
                let next = self.publish(loading.navigating_away());
                info!(provider, "navigating to provider authorization");
                self.navigator.navigate(&url.auth_url);
                Ok(next)
            }
            Err(e) => {
                warn!(error = %e, "failed to start OAuth2 login");
                Ok(self.publish(loading.failed(client_error(&e))))
            }
        }
    }

    /// Logs in with credentials and persists the issued session.
    #[instrument(skip_all)]
    pub async fn login(&self, payload: LoginPayload) -> Result<AuthState, Report<ContextError>> {
        let _guard = self.begin("login")?;
        let loading = self.publish(self.state().loading());

        let outcome = self
            .gateway
            .login(payload.email.trim(), payload.password.trim())
            .await;
        let next = self.settle_credentials(&loading, outcome).await;
        Ok(self.publish(next))
    }

    /// Creates an account and persists the issued session.
    #[instrument(skip_all)]
    pub async fn register(
        &self,
        payload: RegisterPayload,
    ) -> Result<AuthState, Report<ContextError>> {
        let _guard = self.begin("register")?;
        let loading = self.publish(self.state().loading());

        let username = payload.name.as_deref().unwrap_or(&payload.email).trim();
        let outcome = self
            .gateway
            .register(payload.email.trim(), username, payload.password.trim())
            .await;
        let next = self.settle_credentials(&loading, outcome).await;
        Ok(self.publish(next))
    }

    async fn settle_credentials(
        &self,
        loading: &AuthState,
        outcome: Result<CredentialResponse, Report<AuthClientError>>,
    ) -> AuthState {
        match outcome {
            Ok(CredentialResponse::Authenticated { user, token }) => {
                let state = AuthState::authenticated(token.clone(), Some(user));
                match self.session_api.persist(&token).await {
                    Ok(()) => state,
                    Err(e) => {
                        warn!(error = %e, "authenticated but failed to persist session");
                        state.with_error(facade_error(&e))
                    }
                }
            }
            Ok(CredentialResponse::Rejected { message }) => {
                loading.failed(AuthError::with_reason(message, ErrorReason::Server))
            }
            Err(e) => {
                warn!(error = %e, "credential request failed");
                loading.failed(client_error(&e))
            }
        }
    }

    /// Ends the session.
    ///
    /// The Auth Service logout and the facade clear run concurrently. Only
    /// when both fail does the session survive.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<AuthState, Report<ContextError>> {
        let _guard = self.begin("logout")?;
        let loading = self.publish(self.state().loading());
        let token = loading.token().cloned();

        let (remote, local) = tokio::join!(
            self.gateway.logout(token.as_ref()),
            self.session_api.clear()
        );

        let next = match (remote, local) {
            (Err(remote), Err(local)) => {
                warn!(remote = %remote, local = %local, "logout failed");
                loading.failed(AuthError::with_reason(
                    "Unable to log out.",
                    local.current_context().reason(),
                ))
            }
            (remote, local) => {
                if let Err(e) = remote {
                    warn!(error = %e, "auth service logout failed");
                }
                if let Err(e) = local {
                    warn!(error = %e, "failed to clear session cookie");
                }
                AuthState::unauthenticated(None)
            }
        };

        Ok(self.publish(next))
    }
}

fn client_error(report: &Report<AuthClientError>) -> AuthError {
    let error = report.current_context();
    AuthError::with_reason(error.user_message(), error.reason())
}

fn facade_error(report: &Report<SessionApiError>) -> AuthError {
    let error = report.current_context();
    AuthError::with_reason(error.user_message(), error.reason())
}
