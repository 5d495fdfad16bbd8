//! Request authenticator - resolves an inbound request to verified session claims.

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap};
use axum_extra::extract::cookie::CookieJar;

use super::token_service::{AuthError, TokenService};
use crate::config::{AUTHORIZATION_SCHEMES, SESSION_COOKIE_NAME};
use crate::domain::SessionClaims;

/// Extract the raw session token from request headers.
///
/// Looks at the `Bearer` cookie first, then the `Authorization` header with any
/// recognised scheme prefix stripped.
pub fn resolve_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        if !cookie.value().is_empty() {
            return Ok(cookie.value().to_string());
        }
    }

    let header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(str::trim_start)
        .unwrap_or_default();

    let token = AUTHORIZATION_SCHEMES
        .iter()
        .find_map(|scheme| header.strip_prefix(scheme))
        .unwrap_or(header)
        .trim();

    if token.is_empty() {
        return Err(AuthError::NoTokenFound);
    }

    Ok(token.to_string())
}

/// Runs on every protected call before business logic.
#[derive(Clone)]
pub struct RequestAuthenticator {
    tokens: Arc<dyn TokenService>,
}

impl RequestAuthenticator {
    pub fn new(tokens: Arc<dyn TokenService>) -> Self {
        Self { tokens }
    }

    /// Resolve and validate the request's token.
    ///
    /// A missing token collapses to [`AuthError::Unauthorised`]; validation
    /// failures pass through unchanged.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<SessionClaims, AuthError> {
        let token = resolve_token(headers).map_err(|_| AuthError::Unauthorised)?;
        self.tokens.validate(&token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::token_service::{JwtTokenService, MockTokenService};
    use axum::http::{header::COOKIE, HeaderValue};

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_no_token() {
        assert_eq!(resolve_token(&HeaderMap::new()), Err(AuthError::NoTokenFound));
    }

    #[test]
    fn test_cookie() {
        let map = headers(&[(COOKIE, "Bearer=token")]);
        assert_eq!(resolve_token(&map).unwrap(), "token");
    }

    #[test]
    fn test_cookie_wins_over_header() {
        let map = headers(&[(COOKIE, "Bearer=from-cookie"), (AUTHORIZATION, "Bearer from-header")]);
        assert_eq!(resolve_token(&map).unwrap(), "from-cookie");
    }

    #[test]
    fn test_cleared_cookie_falls_back_to_header() {
        let map = headers(&[(COOKIE, "Bearer="), (AUTHORIZATION, "Bearer from-header")]);
        assert_eq!(resolve_token(&map).unwrap(), "from-header");
    }

    #[test]
    fn test_header_schemes_are_stripped() {
        for value in ["Bearer abc", "Token abc", "abc"] {
            let map = headers(&[(AUTHORIZATION, value)]);
            assert_eq!(resolve_token(&map).unwrap(), "abc");
        }
    }

    #[test]
    fn test_scheme_without_token() {
        let map = headers(&[(AUTHORIZATION, "Bearer ")]);
        assert_eq!(resolve_token(&map), Err(AuthError::NoTokenFound));
    }

    #[test]
    fn test_missing_token_is_unauthorised() {
        let mut tokens = MockTokenService::new();
        tokens.expect_validate().never();
        let authenticator = RequestAuthenticator::new(Arc::new(tokens));

        assert_eq!(
            authenticator.authenticate(&HeaderMap::new()),
            Err(AuthError::Unauthorised)
        );
    }

    #[test]
    fn test_invalid_token_passes_through() {
        let authenticator = RequestAuthenticator::new(Arc::new(JwtTokenService::new(b"secret", 15)));
        let map = headers(&[(AUTHORIZATION, "Token sometoken")]);

        assert_eq!(authenticator.authenticate(&map), Err(AuthError::Malformed));
    }

    #[test]
    fn test_valid_token() {
        let tokens = Arc::new(JwtTokenService::new(b"secret", 15));
        let issued = tokens.issue("email").unwrap();
        let authenticator = RequestAuthenticator::new(tokens);
        let map = headers(&[(AUTHORIZATION, &format!("Bearer {}", issued.token))]);

        let claims = authenticator.authenticate(&map).unwrap();
        assert_eq!(claims.email, "email");
    }
}
