//! Authentication status.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of the client-side authentication context.
///
/// `Idle` and `Loading` are indeterminate: the session has not been
/// resolved yet. The other three are settled outcomes of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStatus {
    #[default]
    Idle,
    Loading,
    Authenticated,
    Unauthenticated,
    Error,
}

impl AuthStatus {
    /// Returns true while the session is still being resolved.
    #[must_use]
    pub fn is_indeterminate(&self) -> bool {
        matches!(self, Self::Idle | Self::Loading)
    }

    /// Returns true if protected content must not be shown.
    #[must_use]
    pub fn denies_access(&self) -> bool {
        matches!(self, Self::Unauthenticated | Self::Error)
    }

    /// Returns the lowercase wire name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Authenticated => "authenticated",
            Self::Unauthenticated => "unauthenticated",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indeterminate_and_denied_are_disjoint() {
        for status in [
            AuthStatus::Idle,
            AuthStatus::Loading,
            AuthStatus::Authenticated,
            AuthStatus::Unauthenticated,
            AuthStatus::Error,
        ] {
            assert!(!(status.is_indeterminate() && status.denies_access()));
        }
        assert!(!AuthStatus::Authenticated.is_indeterminate());
        assert!(!AuthStatus::Authenticated.denies_access());
    }

    #[test]
    fn wire_names_match_serde() {
        let json = serde_json::to_string(&AuthStatus::Unauthenticated).expect("serialize");
        assert_eq!(json, "\"unauthenticated\"");
        assert_eq!(AuthStatus::Unauthenticated.to_string(), "unauthenticated");
    }
}
