//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys
//! use a double underscore, e.g. `AUTH_SERVICE__BASE_URL` or
//! `SESSION__SECURE_COOKIES`.
//!
//! See [`AuthServiceConfig`] for the Auth Service connection.

use area_portal_auth_client::AuthServiceConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origin browsers use to reach the portal, without a trailing slash.
    #[serde(default = "default_public_origin")]
    pub public_origin: String,

    /// Auth Service connection.
    #[serde(default)]
    pub auth_service: AuthServiceConfig,

    /// Session cookie configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Route targets for redirects.
    #[serde(default)]
    pub routes: RouteConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_public_origin() -> String {
    "http://localhost:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            public_origin: default_public_origin(),
            auth_service: AuthServiceConfig::default(),
            session: SessionConfig::default(),
            routes: RouteConfig::default(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Whether to set the Secure flag on the session cookie (requires HTTPS).
    /// Off by default for local HTTP development; turn on in production.
    #[serde(default)]
    pub secure_cookies: bool,

    /// Session cookie lifetime in days.
    #[serde(default = "default_max_age_days")]
    pub max_age_days: i64,
}

fn default_max_age_days() -> i64 {
    7
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure_cookies: false,
            max_age_days: default_max_age_days(),
        }
    }
}

/// Where redirects point.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteConfig {
    #[serde(default = "default_login_route")]
    pub login_route: String,

    /// Destination after a completed OAuth2 login.
    #[serde(default = "default_post_login_redirect")]
    pub post_login_redirect: String,
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_post_login_redirect() -> String {
    "/area".to_string()
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            login_route: default_login_route(),
            post_login_redirect: default_post_login_redirect(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Public origin with any trailing slash removed.
    pub fn origin(&self) -> &str {
        self.public_origin.trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_config_has_correct_defaults() {
        let config = SessionConfig::default();
        assert!(!config.secure_cookies);
        assert_eq!(config.max_age_days, 7);
    }

    #[test]
    fn route_config_defaults() {
        let config = RouteConfig::default();
        assert_eq!(config.login_route, "/login");
        assert_eq!(config.post_login_redirect, "/area");
    }

    #[test]
    fn origin_drops_trailing_slash() {
        let config = ServerConfig {
            public_origin: "https://area.example.com/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.origin(), "https://area.example.com");
    }

    #[test]
    fn nested_sections_deserialize_with_defaults() {
        let config: ServerConfig = config::Config::builder()
            .set_override("session.secure_cookies", true)
            .expect("override")
            .set_override("auth_service.base_url", "http://gateway:8080")
            .expect("override")
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert!(config.session.secure_cookies);
        assert_eq!(config.session.max_age_days, 7);
        assert_eq!(
            config.auth_service.normalized_base_url(),
            "http://gateway:8080/area_auth_api"
        );
        assert_eq!(config.routes.login_route, "/login");
    }
}
