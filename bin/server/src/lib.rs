//! AREA web portal server.
//!
//! This crate provides the same-origin HTTP surface of the portal: the
//! session facade over the HTTP-only session cookie, proxies to the Auth
//! Service, and the server-side OAuth2 callback route.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
