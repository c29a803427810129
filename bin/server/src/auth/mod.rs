//! Authentication module for the portal server.
//!
//! This module provides:
//! - The session cookie store and the same-origin session facade
//! - Proxies to the Auth Service for credential and OAuth2 flows
//! - The server-side OAuth2 callback route
//! - Session extractors for Axum routes
//!
//! The server holds no session state of its own. The cookie carries the
//! Auth Service token, and every validation is an authenticated-user
//! lookup against the Auth Service.

pub mod cookie;
pub mod middleware;
pub mod proxy;
pub mod routes;

use area_portal_auth_client::{AuthClientError, AuthServiceClient};
use area_portal_session::RouteGuard;
use rootcause::prelude::Report;

use crate::config::{RouteConfig, ServerConfig};

pub use cookie::{SESSION_COOKIE, SessionCookieStore};
pub use middleware::{AuthRejection, AuthenticatedSession, OptionalSession, RequireSession};

/// Shared application state.
pub struct AppState {
    /// Auth Service client.
    pub auth_client: AuthServiceClient,
    /// Session cookie store.
    pub cookies: SessionCookieStore,
    /// Decides which paths redirect to login.
    pub guard: RouteGuard,
    /// Redirect targets.
    pub routes: RouteConfig,
    /// Public origin, without a trailing slash.
    pub public_origin: String,
}

impl AppState {
    /// Creates the application state from configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, Report<AuthClientError>> {
        Ok(Self {
            auth_client: AuthServiceClient::new(&config.auth_service)?,
            cookies: SessionCookieStore::new(&config.session),
            guard: RouteGuard::new(config.routes.login_route.clone()),
            routes: config.routes.clone(),
            public_origin: config.origin().to_string(),
        })
    }
}
