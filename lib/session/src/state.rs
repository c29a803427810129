//! Snapshot of the authentication context.

use area_portal_core::{AuthError, AuthStatus, Session, SessionToken, User};

/// Immutable view of authentication state.
///
/// Only constructible through the transitions below, which keep `status`
/// consistent with the session: `Authenticated` always carries a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    status: AuthStatus,
    session: Session,
    user: Option<User>,
    error: Option<AuthError>,
}

impl AuthState {
    /// Initial state: authenticated when the server supplied a token, idle otherwise.
    #[must_use]
    pub fn initial(token: Option<SessionToken>, user: Option<User>) -> Self {
        match token {
            Some(token) => Self::authenticated(token, user),
            None => Self::default(),
        }
    }

    #[must_use]
    pub fn authenticated(token: SessionToken, user: Option<User>) -> Self {
        Self {
            status: AuthStatus::Authenticated,
            session: Session::with_token(token),
            user,
            error: None,
        }
    }

    /// No session. Token and user are cleared together.
    #[must_use]
    pub fn unauthenticated(error: Option<AuthError>) -> Self {
        Self {
            status: AuthStatus::Unauthenticated,
            session: Session::empty(),
            user: None,
            error,
        }
    }

    /// An operation started: previous error cleared, session kept.
    #[must_use]
    pub fn loading(&self) -> Self {
        Self {
            status: AuthStatus::Loading,
            error: None,
            ..self.clone()
        }
    }

    /// An operation failed: session and user left untouched.
    #[must_use]
    pub fn failed(&self, error: AuthError) -> Self {
        Self {
            status: AuthStatus::Error,
            error: Some(error),
            ..self.clone()
        }
    }

    /// The page is about to be replaced by a full navigation.
    #[must_use]
    pub fn navigating_away(&self) -> Self {
        Self {
            status: AuthStatus::Idle,
            error: None,
            ..self.clone()
        }
    }

    /// Attaches a non-fatal error without changing status.
    #[must_use]
    pub fn with_error(mut self, error: AuthError) -> Self {
        self.error = Some(error);
        self
    }

    #[must_use]
    pub fn status(&self) -> AuthStatus {
        self.status
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn token(&self) -> Option<&SessionToken> {
        self.session.token()
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&AuthError> {
        self.error.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::Loading
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use area_portal_core::UserId;

    fn token() -> SessionToken {
        SessionToken::new("t").expect("token")
    }

    #[test]
    fn initial_state_follows_server_token() {
        assert_eq!(AuthState::initial(None, None).status(), AuthStatus::Idle);

        let state = AuthState::initial(Some(token()), None);
        assert_eq!(state.status(), AuthStatus::Authenticated);
        assert!(state.token().is_some());
    }

    #[test]
    fn failure_keeps_session_and_user() {
        let user = User::new(UserId::new("1"), "a@b.com");
        let state = AuthState::authenticated(token(), Some(user.clone()));
        let failed = state.loading().failed(AuthError::new("nope"));

        assert_eq!(failed.status(), AuthStatus::Error);
        assert_eq!(failed.user(), Some(&user));
        assert!(failed.token().is_some());
        assert_eq!(failed.error().map(AuthError::message), Some("nope"));
    }

    #[test]
    fn loading_clears_previous_error() {
        let state = AuthState::unauthenticated(Some(AuthError::new("expired")));
        let loading = state.loading();

        assert!(loading.is_loading());
        assert!(loading.error().is_none());
    }

    #[test]
    fn unauthenticated_never_holds_a_token() {
        let state = AuthState::unauthenticated(None);
        assert!(state.token().is_none());
        assert!(state.user().is_none());
    }
}
