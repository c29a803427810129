//! Core domain types for the AREA web portal.
//!
//! This crate provides the session, identity, and status types shared by
//! the Auth Service client, the client-side authentication context, and the
//! server that owns the session cookie.

pub mod error;
pub mod provider;
pub mod session;
pub mod status;
pub mod user;

pub use error::{AuthError, ErrorReason};
pub use provider::ProviderStatus;
pub use session::{Session, SessionStatus, SessionToken};
pub use status::AuthStatus;
pub use user::{User, UserId};
