//! OAuth2 callback handling.
//!
//! [`validate`] checks the redirect parameters in a fixed order and makes
//! no network call. [`OAuthCallbackHandler`] runs validation, the code
//! exchange, and session persistence at most once per callback visit.

use std::fmt;
use std::sync::Arc;

use area_portal_auth_client::{CallbackOptions, OAuthCallbackPayload};
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::context::DEFAULT_POST_LOGIN_PATH;
use crate::facade::SessionApi;
use crate::gateway::{AuthGateway, Navigator};

/// Why callback parameters were refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// The provider redirected back with an `error` parameter.
    ProviderDenied { error: String },
    /// `code` is absent, empty, or repeated.
    MissingCode,
    /// `state` is absent, empty, or repeated.
    MissingState,
}

impl CallbackError {
    /// Message safe to show to the user.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::ProviderDenied { .. } => {
                "The OAuth2 provider returned an error. Please try again."
            }
            Self::MissingCode => "The 'code' parameter is missing from the callback URL.",
            Self::MissingState => "The 'state' parameter is missing from the callback URL.",
        }
    }
}

impl fmt::Display for CallbackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderDenied { error } => write!(f, "provider returned error '{error}'"),
            Self::MissingCode => write!(f, "missing code"),
            Self::MissingState => write!(f, "missing state"),
        }
    }
}

impl std::error::Error for CallbackError {}

/// The single non-empty value of `name`, if there is exactly one.
fn single<'a>(params: &'a [(String, String)], name: &str) -> Option<&'a str> {
    let mut values = params.iter().filter(|(key, _)| key == name);
    match (values.next(), values.next()) {
        (Some((_, value)), None) if !value.is_empty() => Some(value),
        _ => None,
    }
}

/// Validates callback query parameters.
///
/// Checks run in order: `error`, then `code`, then `state`. The first
/// failure wins, so a provider error is reported even when a code and
/// state are also present.
pub fn validate(params: &[(String, String)]) -> Result<OAuthCallbackPayload, CallbackError> {
    if let Some((_, error)) = params
        .iter()
        .find(|(key, value)| key == "error" && !value.is_empty())
    {
        return Err(CallbackError::ProviderDenied {
            error: error.clone(),
        });
    }

    let code = single(params, "code").ok_or(CallbackError::MissingCode)?;
    let state = single(params, "state").ok_or(CallbackError::MissingState)?;

    Ok(OAuthCallbackPayload::new(code, state))
}

/// Progress of one callback visit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CallbackStatus {
    #[default]
    Idle,
    Processing,
    Success,
    Error(String),
}

/// Runs a callback visit once.
pub struct OAuthCallbackHandler {
    gateway: Arc<dyn AuthGateway>,
    session_api: Arc<dyn SessionApi>,
    navigator: Arc<dyn Navigator>,
    redirect_to: String,
    callback_url: Option<String>,
    status: watch::Sender<CallbackStatus>,
}

impl OAuthCallbackHandler {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        session_api: Arc<dyn SessionApi>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            gateway,
            session_api,
            navigator,
            redirect_to: DEFAULT_POST_LOGIN_PATH.to_string(),
            callback_url: None,
            status: watch::Sender::new(CallbackStatus::Idle),
        }
    }

    /// Where to navigate after a successful exchange.
    #[must_use]
    pub fn with_redirect(mut self, redirect_to: impl Into<String>) -> Self {
        self.redirect_to = redirect_to.into();
        self
    }

    /// Redirect URI to forward to the exchange.
    #[must_use]
    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    pub fn status(&self) -> CallbackStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CallbackStatus> {
        self.status.subscribe()
    }

    /// Handles the callback parameters.
    ///
    /// Only the first call does anything; later calls return the current
    /// status unchanged, whether the first is still processing or done.
    #[instrument(skip_all)]
    pub async fn handle(&self, params: &[(String, String)]) -> CallbackStatus {
        let mut payload = None;
        let started = self.status.send_if_modified(|status| {
            if *status != CallbackStatus::Idle {
                return false;
            }
            *status = match validate(params) {
                Ok(valid) => {
                    payload = Some(valid);
                    CallbackStatus::Processing
                }
                Err(e) => {
                    warn!(error = %e, "rejected OAuth2 callback");
                    CallbackStatus::Error(e.user_message().to_string())
                }
            };
            true
        });

        let Some(payload) = payload.filter(|_| started) else {
            return self.status();
        };

        let options = CallbackOptions {
            callback_url: self.callback_url.clone(),
        };
        let outcome = match self.gateway.exchange_callback(payload, options).await {
            Ok(response) => match response.application_token() {
                Some(token) => match self.session_api.persist(token).await {
                    Ok(()) => {
                        info!(provider = %response.grant().provider, "OAuth2 login completed");
                        CallbackStatus::Success
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to persist OAuth2 session");
                        CallbackStatus::Error(e.current_context().user_message())
                    }
                },
                None => {
                    info!(provider = %response.grant().provider, "provider linked");
                    CallbackStatus::Success
                }
            },
            Err(e) => {
                warn!(error = %e, "OAuth2 code exchange failed");
                CallbackStatus::Error(e.current_context().user_message())
            }
        };

        self.status.send_replace(outcome.clone());
        if outcome == CallbackStatus::Success {
            self.navigator.navigate(&self.redirect_to);
        }
        outcome
    }
}
