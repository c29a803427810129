//! Client-side session lifecycle for the AREA web portal.
//!
//! This crate provides:
//! - [`AuthContext`]: the authentication state machine, one per application
//!   root, serializing operations through a single in-flight slot
//! - [`OAuthCallbackHandler`]: validation and one-shot handling of the
//!   provider redirect
//! - [`RouteGuard`]: allow-list based route protection
//! - [`SessionApiClient`]: HTTP client for the same-origin session facade
//!
//! Network and navigation go through the [`AuthGateway`], [`SessionApi`]
//! and [`Navigator`] traits.

pub mod callback;
pub mod context;
pub mod error;
pub mod facade;
pub mod gateway;
pub mod guard;
pub mod state;

#[cfg(test)]
mod testing;

pub use callback::{CallbackError, CallbackStatus, OAuthCallbackHandler, validate};
pub use context::{AuthContext, LoginPayload, OAuthLoginOptions, RegisterPayload};
pub use error::{ContextError, SessionApiCall, SessionApiError};
pub use facade::{SessionApi, SessionApiClient};
pub use gateway::{AuthGateway, Navigator};
pub use guard::{GuardDecision, PUBLIC_ROUTES, RouteGuard, is_public_route};
pub use state::AuthState;
