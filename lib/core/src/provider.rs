//! Third-party provider connection status.

use serde::{Deserialize, Serialize};

/// Whether the current user has connected a given OAuth2 provider.
///
/// A read-only projection fetched on demand; never persisted by the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub provider: String,
    pub is_logged: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub need_reconnecting: Option<bool>,
}

impl ProviderStatus {
    /// A provider the user has not connected.
    #[must_use]
    pub fn disconnected(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            is_logged: false,
            logo_url: None,
            need_reconnecting: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upstream_shape() {
        let status: ProviderStatus = serde_json::from_value(serde_json::json!({
            "provider": "github",
            "is_logged": true,
            "logo_url": "https://cdn/github.svg"
        }))
        .expect("deserialize");

        assert!(status.is_logged);
        assert_eq!(status.need_reconnecting, None);
    }

    #[test]
    fn disconnected_is_not_logged() {
        let status = ProviderStatus::disconnected("google");
        assert_eq!(status.provider, "google");
        assert!(!status.is_logged);
    }
}
