//! Recording fakes for the context seams.

use std::sync::{Arc, Mutex};

use area_portal_auth_client::{
    AuthClientError, AuthorizeOptions, CallbackOptions, CredentialResponse, OAuthAuthorizeUrl,
    OAuthCallbackPayload, OAuthCallbackResponse,
};
use area_portal_core::{SessionStatus, SessionToken, User, UserId};
use async_trait::async_trait;
use rootcause::prelude::Report;
use tokio::sync::Notify;

use crate::error::{SessionApiCall, SessionApiError};
use crate::facade::SessionApi;
use crate::gateway::{AuthGateway, Navigator};

pub(crate) fn sample_user() -> User {
    User::new(UserId::new("1"), "a@b.com")
        .with_username(Some("ab".to_string()))
        .with_name(Some("ab".to_string()))
}

fn unset() -> AuthClientError {
    AuthClientError::InvalidInput {
        reason: "fake response not configured".to_string(),
    }
}

#[derive(Default)]
pub(crate) struct FakeGateway {
    calls: Mutex<Vec<String>>,
    login: Mutex<Option<Result<CredentialResponse, AuthClientError>>>,
    register: Mutex<Option<Result<CredentialResponse, AuthClientError>>>,
    authorize: Mutex<Option<Result<OAuthAuthorizeUrl, AuthClientError>>>,
    exchange: Mutex<Option<Result<OAuthCallbackResponse, AuthClientError>>>,
    last_authorize_callback: Mutex<Option<String>>,
    logout_fails: Mutex<bool>,
    login_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeGateway {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub(crate) fn set_login(&self, result: Result<CredentialResponse, AuthClientError>) {
        *self.login.lock().unwrap() = Some(result);
    }

    pub(crate) fn set_register(&self, result: Result<CredentialResponse, AuthClientError>) {
        *self.register.lock().unwrap() = Some(result);
    }

    pub(crate) fn set_authorize(&self, result: Result<OAuthAuthorizeUrl, AuthClientError>) {
        *self.authorize.lock().unwrap() = Some(result);
    }

    pub(crate) fn set_exchange(&self, result: Result<OAuthCallbackResponse, AuthClientError>) {
        *self.exchange.lock().unwrap() = Some(result);
    }

    pub(crate) fn last_authorize_callback(&self) -> Option<String> {
        self.last_authorize_callback.lock().unwrap().clone()
    }

    pub(crate) fn fail_logout(&self) {
        *self.logout_fails.lock().unwrap() = true;
    }

    pub(crate) fn hold_login_until(&self, gate: Arc<Notify>) {
        *self.login_gate.lock().unwrap() = Some(gate);
    }
}

fn take<T: Clone>(
    slot: &Mutex<Option<Result<T, AuthClientError>>>,
) -> Result<T, Report<AuthClientError>> {
    let configured = slot.lock().unwrap().clone();
    Ok(configured.unwrap_or_else(|| Err(unset()))?)
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn login(
        &self,
        email_or_username: &str,
        _password: &str,
    ) -> Result<CredentialResponse, Report<AuthClientError>> {
        self.record(format!("login:{email_or_username}"));
        let gate = self.login_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        take(&self.login)
    }

    async fn register(
        &self,
        email: &str,
        username: &str,
        _password: &str,
    ) -> Result<CredentialResponse, Report<AuthClientError>> {
        self.record(format!("register:{email}:{username}"));
        take(&self.register)
    }

    async fn authorize_url(
        &self,
        provider: &str,
        options: AuthorizeOptions,
    ) -> Result<OAuthAuthorizeUrl, Report<AuthClientError>> {
        let with_token = if options.token.is_some() {
            "token"
        } else {
            "anonymous"
        };
        self.record(format!(
            "authorize:{provider}:{}:{with_token}",
            options.mode.as_str()
        ));
        *self.last_authorize_callback.lock().unwrap() = options.callback_url;
        take(&self.authorize)
    }

    async fn exchange_callback(
        &self,
        payload: OAuthCallbackPayload,
        _options: CallbackOptions,
    ) -> Result<OAuthCallbackResponse, Report<AuthClientError>> {
        self.record(format!("exchange:{}", payload.code.secret()));
        take(&self.exchange)
    }

    async fn logout(&self, _token: Option<&SessionToken>) -> Result<(), Report<AuthClientError>> {
        self.record("logout".to_string());
        if *self.logout_fails.lock().unwrap() {
            return Err(AuthClientError::Transport {
                details: "fake logout failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeSessionApi {
    calls: Mutex<Vec<String>>,
    status: Mutex<Option<Result<SessionStatus, SessionApiError>>>,
    persist_fails: Mutex<bool>,
    clear_fails: Mutex<bool>,
}

impl FakeSessionApi {
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn set_status(&self, result: Result<SessionStatus, SessionApiError>) {
        *self.status.lock().unwrap() = Some(result);
    }

    pub(crate) fn fail_persist(&self) {
        *self.persist_fails.lock().unwrap() = true;
    }

    pub(crate) fn fail_clear(&self) {
        *self.clear_fails.lock().unwrap() = true;
    }
}

#[async_trait]
impl SessionApi for FakeSessionApi {
    async fn fetch_status(&self) -> Result<SessionStatus, Report<SessionApiError>> {
        self.calls.lock().unwrap().push("status".to_string());
        let configured = self.status.lock().unwrap().clone();
        Ok(configured.unwrap_or_else(|| Ok(SessionStatus::anonymous()))?)
    }

    async fn persist(&self, token: &SessionToken) -> Result<(), Report<SessionApiError>> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("persist:{}", token.as_str()));
        if *self.persist_fails.lock().unwrap() {
            return Err(SessionApiError::Rejected {
                call: SessionApiCall::Persist,
                status: 500,
            }
            .into());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), Report<SessionApiError>> {
        self.calls.lock().unwrap().push("clear".to_string());
        if *self.clear_fails.lock().unwrap() {
            return Err(SessionApiError::Transport {
                call: SessionApiCall::Clear,
                details: "fake clear failure".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct RecordingNavigator {
    visited: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub(crate) fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, url: &str) {
        self.visited.lock().unwrap().push(url.to_string());
    }
}
