//! Route protection based on authentication status.

use area_portal_core::AuthStatus;

/// Routes anyone may view.
pub const PUBLIC_ROUTES: &[&str] = &["/", "/login", "/register", "/auth/callback"];

/// Route unauthenticated visitors are sent to.
pub const DEFAULT_LOGIN_ROUTE: &str = "/login";

/// Text shown while the session is unresolved on a protected route.
pub const LOADING_PLACEHOLDER: &str = "Loading session...";

/// What to do with a request for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Show the requested content.
    Render,
    /// Show the neutral placeholder; neither content nor a redirect.
    Loading,
    /// Replace the location with the given route.
    Redirect(String),
}

impl GuardDecision {
    /// Text to show in place of the route, for [`GuardDecision::Loading`].
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING_PLACEHOLDER),
            Self::Render | Self::Redirect(_) => None,
        }
    }
}

/// Decides access to routes from a static allow-list.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    public_routes: Vec<String>,
    login_route: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(DEFAULT_LOGIN_ROUTE)
    }
}

impl RouteGuard {
    /// Creates a guard with the default public routes.
    pub fn new(login_route: impl Into<String>) -> Self {
        Self {
            public_routes: PUBLIC_ROUTES.iter().map(|r| r.to_string()).collect(),
            login_route: login_route.into(),
        }
    }

    /// Replaces the public route list.
    #[must_use]
    pub fn with_public_routes<I, S>(mut self, routes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.public_routes = routes.into_iter().map(Into::into).collect();
        self
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Returns true for an exact public route or a path below one.
    ///
    /// The root only matches exactly; everything would be under it
    /// otherwise. An unknown path is public.
    pub fn is_public(&self, path: Option<&str>) -> bool {
        let Some(path) = path else {
            return true;
        };
        self.public_routes.iter().any(|route| {
            path == route
                || (route != "/"
                    && path
                        .strip_prefix(route.as_str())
                        .is_some_and(|rest| rest.starts_with('/')))
        })
    }

    /// Decides what to show for `path` given the current status.
    pub fn decide(&self, path: Option<&str>, status: AuthStatus) -> GuardDecision {
        if self.is_public(path) || status == AuthStatus::Authenticated {
            return GuardDecision::Render;
        }
        if status.denies_access() {
            return GuardDecision::Redirect(self.login_route.clone());
        }
        GuardDecision::Loading
    }
}

/// [`RouteGuard::is_public`] with the default routes.
pub fn is_public_route(path: Option<&str>) -> bool {
    RouteGuard::default().is_public(path)
}
