//! HTTP client for the AREA Auth Service.
//!
//! This crate provides:
//! - Credential login and registration, returning the upstream status
//!   verbatim alongside the body
//! - OAuth2 authorize-URL retrieval for the `login` and `link` flows
//! - Callback code exchange, decoded into a per-flow tagged union
//! - Authenticated-user lookup used to validate session tokens
//! - Provider listing, with a best-effort per-user connection status
//!
//! Every Auth Service response uses the same `{success, data, error}`
//! envelope; the types in [`types`] enforce the required fields of each
//! endpoint at the boundary so callers never see a half-populated record.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::AuthServiceClient;
pub use config::AuthServiceConfig;
pub use error::AuthClientError;
pub use types::{
    AuthorizeMode, AuthorizeOptions, AuthorizeRequest, CallbackOptions, CredentialResponse,
    OAuthAuthorizeUrl, OAuthCallbackPayload, OAuthCallbackResponse, ProviderGrant, UpstreamReply,
};
