//! Session cookie construction.

use axum_extra::extract::cookie::Cookie;
use chrono::Utc;
use cookie::time::Duration;

use crate::config::{Config, SESSION_COOKIE_NAME};
use crate::domain::SessionClaims;

/// Attributes shared by every session cookie the service sets.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Cookie domain
    pub domain: String,
    /// Set the `Secure` flag (TLS deployments)
    pub secure: bool,
}

impl CookieSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            domain: config.site_domain.clone(),
            secure: config.use_ssl,
        }
    }

    /// Cookie carrying `claims.token`, living exactly as long as the token.
    pub fn session_cookie(&self, claims: &SessionClaims) -> Cookie<'static> {
        let max_age = claims.remaining_seconds(Utc::now());
        self.build(claims.token.clone(), max_age)
    }

    /// Empty cookie that makes the browser drop the session immediately.
    pub fn clear_cookie(&self) -> Cookie<'static> {
        self.build(String::new(), 0)
    }

    fn build(&self, value: String, max_age_seconds: i64) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .path("/")
            .domain(self.domain.clone())
            .secure(self.secure)
            .http_only(true)
            .max_age(Duration::seconds(max_age_seconds))
            .build()
    }
}
