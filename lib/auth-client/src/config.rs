//! Auth Service connection configuration.

use serde::{Deserialize, Serialize};

/// Path segment under which the gateway exposes the Auth Service.
const AUTH_API_SEGMENT: &str = "/area_auth_api";

/// Legacy service name some deployments still put in the base URL.
const LEGACY_SERVICE_SEGMENT: &str = "/auth-service";

/// Configuration for reaching the Auth Service.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthServiceConfig {
    /// Gateway or Auth Service base URL. Normalized by [`Self::normalized_base_url`].
    #[serde(default = "default_base_url")]
    base_url: String,
    /// Providers reported as disconnected when the per-user lookup fails.
    /// Comma-separated.
    #[serde(default = "default_known_providers")]
    known_providers: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/area_auth_api".to_string()
}

fn default_known_providers() -> String {
    "google,github,discord".to_string()
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            known_providers: default_known_providers(),
        }
    }
}

impl AuthServiceConfig {
    /// Creates a configuration for the given base URL with default providers.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            known_providers: default_known_providers(),
        }
    }

    /// Replaces the known provider list.
    #[must_use]
    pub fn with_known_providers(mut self, providers: &[&str]) -> Self {
        self.known_providers = providers.join(",");
        self
    }

    /// Returns the base URL as configured.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the base URL pointing at the Auth Service API root.
    ///
    /// Trailing slashes are dropped. A URL already ending in the API segment
    /// is kept, a legacy service suffix is rewritten, and anything else gets
    /// the API segment appended.
    #[must_use]
    pub fn normalized_base_url(&self) -> String {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.ends_with(AUTH_API_SEGMENT) {
            return trimmed.to_string();
        }
        if let Some(root) = trimmed.strip_suffix(LEGACY_SERVICE_SEGMENT) {
            return format!("{root}{AUTH_API_SEGMENT}");
        }
        format!("{trimmed}{AUTH_API_SEGMENT}")
    }

    /// Returns the known providers, parsed from the comma-separated string.
    #[must_use]
    pub fn known_providers(&self) -> Vec<String> {
        self.known_providers
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_url_already_pointing_at_api() {
        let config = AuthServiceConfig::new("http://gw:8080/area_auth_api/");
        assert_eq!(config.normalized_base_url(), "http://gw:8080/area_auth_api");
    }

    #[test]
    fn rewrites_legacy_service_suffix() {
        let config = AuthServiceConfig::new("http://gw:8080/auth-service");
        assert_eq!(config.normalized_base_url(), "http://gw:8080/area_auth_api");
    }

    #[test]
    fn appends_api_segment_to_bare_gateway() {
        let config = AuthServiceConfig::new("https://api.example.com//");
        assert_eq!(
            config.normalized_base_url(),
            "https://api.example.com/area_auth_api"
        );
    }

    #[test]
    fn known_providers_are_trimmed() {
        let config = AuthServiceConfig::default();
        assert_eq!(config.known_providers(), vec!["google", "github", "discord"]);

        let config = config.with_known_providers(&[" notion ", "", "dropbox"]);
        assert_eq!(config.known_providers(), vec!["notion", "dropbox"]);
    }
}
