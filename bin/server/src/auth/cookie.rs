//! Session cookie store.
//!
//! The cookie holds the Auth Service bearer token and nothing else. It is
//! HTTP-only so page scripts never see it; they go through the session
//! facade instead.

use area_portal_core::SessionToken;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;

use crate::config::SessionConfig;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "session";

/// Reads and writes the session cookie with consistent attributes.
#[derive(Debug, Clone)]
pub struct SessionCookieStore {
    secure: bool,
    max_age: TimeDuration,
}

impl SessionCookieStore {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            secure: config.secure_cookies,
            max_age: TimeDuration::days(config.max_age_days),
        }
    }

    fn build(&self, value: String, max_age: TimeDuration) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(max_age)
            .build()
    }

    /// Returns the stored token. An empty cookie counts as absent.
    pub fn get(&self, jar: &CookieJar) -> Option<SessionToken> {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| SessionToken::new(cookie.value()))
    }

    /// Stores `token`, replacing any previous value.
    pub fn set(&self, jar: CookieJar, token: &SessionToken) -> CookieJar {
        jar.add(self.build(token.as_str().to_string(), self.max_age))
    }

    /// Expires the cookie. Safe to call when no cookie is set.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.build(String::new(), TimeDuration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue, header};

    fn store(secure: bool) -> SessionCookieStore {
        SessionCookieStore::new(&SessionConfig {
            secure_cookies: secure,
            max_age_days: 7,
        })
    }

    fn jar_with(cookie: &str) -> CookieJar {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(cookie).expect("header"));
        CookieJar::from_headers(&headers)
    }

    #[test]
    fn reads_token_from_request_cookie() {
        let token = store(false).get(&jar_with("theme=dark; session=abc123"));
        assert_eq!(token.map(|t| t.as_str().to_string()), Some("abc123".to_string()));
    }

    #[test]
    fn empty_cookie_is_no_session() {
        assert!(store(false).get(&jar_with("session=")).is_none());
        assert!(store(false).get(&CookieJar::new()).is_none());
    }

    #[test]
    fn set_uses_session_attributes() {
        let token = SessionToken::new("abc").expect("token");
        let jar = store(true).set(CookieJar::new(), &token);
        let cookie = jar.get(SESSION_COOKIE).expect("cookie");

        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(TimeDuration::days(7)));
    }

    #[test]
    fn clear_expires_immediately() {
        let jar = store(false).clear(jar_with("session=abc"));
        let cookie = jar.get(SESSION_COOKIE).expect("cookie");

        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(TimeDuration::ZERO));
    }
}
