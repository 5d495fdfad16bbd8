//! Token service - issues and validates signed, time-bound session tokens.
//!
//! Tokens are HS256 JWTs. Verification is stateless: there is no session store
//! and no way to revoke a token before it expires.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::SessionClaims;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Authentication failures.
///
/// The three token failures share one user-facing message so callers cannot
/// tell a forged token from an expired or garbled one.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("No token found")]
    NoTokenFound,

    #[error("Bearer token invalid")]
    InvalidSignature,

    #[error("Bearer token invalid")]
    Expired,

    #[error("Bearer token invalid")]
    Malformed,

    #[error("Unauthorised")]
    Unauthorised,
}

/// Failure while signing a token.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("could not sign session token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("token expiry is out of range")]
    ExpiryOutOfRange,
}

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    email: String,
    iat: i64,
    exp: i64,
    /// Unique per token, so two tokens issued in the same second still differ
    jti: String,
}

/// Session token port.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait TokenService: Send + Sync {
    /// Issue a fresh token for `subject_email`.
    fn issue(&self, subject_email: &str) -> Result<SessionClaims, SigningError>;

    /// Verify signature and expiry, returning the claims only when both hold.
    fn validate(&self, token: &str) -> Result<SessionClaims, AuthError>;
}

/// HS256 implementation of [`TokenService`].
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
    validation: Validation,
}

impl JwtTokenService {
    /// Create a token service signing with `secret`, issuing tokens valid for `expiry_minutes`.
    ///
    /// A lifetime too large to represent saturates; issuing then fails with
    /// [`SigningError::ExpiryOutOfRange`].
    pub fn new(secret: &[u8], expiry_minutes: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry: Duration::try_minutes(expiry_minutes).unwrap_or(Duration::MAX),
            validation,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.secret_key_bytes(), config.token_expiration_minutes)
    }

    fn sign(&self, email: &str, issued_at: DateTime<Utc>) -> Result<SessionClaims, SigningError> {
        let expires_at = issued_at
            .checked_add_signed(self.expiry)
            .ok_or(SigningError::ExpiryOutOfRange)?;
        let claims = JwtClaims {
            email: email.to_string(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(SessionClaims {
            email: claims.email,
            issued_at: timestamp(claims.iat).unwrap_or(issued_at),
            expires_at: timestamp(claims.exp).unwrap_or(expires_at),
            token,
        })
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, subject_email: &str) -> Result<SessionClaims, SigningError> {
        self.sign(subject_email, Utc::now())
    }

    fn validate(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                tracing::debug!("Rejected session token: {}", e);
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                    ErrorKind::ExpiredSignature => AuthError::Expired,
                    _ => AuthError::Malformed,
                }
            },
        )?;

        let claims = data.claims;
        let issued_at = timestamp(claims.iat).ok_or(AuthError::Malformed)?;
        let expires_at = timestamp(claims.exp).ok_or(AuthError::Malformed)?;

        // jsonwebtoken accepts a token throughout its `exp` second
        if expires_at <= Utc::now() {
            return Err(AuthError::Expired);
        }

        Ok(SessionClaims {
            email: claims.email,
            issued_at,
            expires_at,
            token: token.to_string(),
        })
    }
}

fn timestamp(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"averysecretkey";

    #[test]
    fn test_issue_then_validate() {
        let service = JwtTokenService::new(SECRET, 15);
        let issued = service.issue("some@email.com").unwrap();

        assert!(!issued.token.is_empty());
        assert_eq!(issued.email, "some@email.com");
        assert_eq!(issued.expires_at - issued.issued_at, Duration::minutes(15));

        let claims = service.validate(&issued.token).unwrap();
        assert_eq!(claims.email, "some@email.com");
        assert_eq!(claims.expires_at, issued.expires_at);
        assert_eq!(claims.token, issued.token);
    }

    #[test]
    fn test_tokens_are_unique() {
        let service = JwtTokenService::new(SECRET, 15);
        let first = service.issue("some@email.com").unwrap();
        let second = service.issue("some@email.com").unwrap();

        assert_ne!(first.token, second.token);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = JwtTokenService::new(SECRET, -1);
        let issued = service.issue("some@email.com").unwrap();

        assert_eq!(service.validate(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn test_zero_expiry_is_rejected() {
        let service = JwtTokenService::new(SECRET, 0);
        let issued = service.issue("some@email.com").unwrap();

        assert_eq!(service.validate(&issued.token), Err(AuthError::Expired));
    }

    #[test]
    fn test_unrepresentable_expiry_fails_to_sign() {
        for minutes in [1_000_000_000_000, i64::MAX] {
            let service = JwtTokenService::new(SECRET, minutes);
            assert!(matches!(
                service.issue("some@email.com"),
                Err(SigningError::ExpiryOutOfRange)
            ));
        }
    }

    #[test]
    fn test_other_key_is_invalid_signature() {
        let issuer = JwtTokenService::new(b"another-secret", 15);
        let validator = JwtTokenService::new(SECRET, 15);
        let issued = issuer.issue("some@email.com").unwrap();

        assert_eq!(
            validator.validate(&issued.token),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = JwtTokenService::new(SECRET, 15);
        assert_eq!(service.validate("invalidstring"), Err(AuthError::Malformed));
        assert_eq!(service.validate(""), Err(AuthError::Malformed));
    }

    #[test]
    fn test_token_failures_share_message() {
        for error in [AuthError::InvalidSignature, AuthError::Expired, AuthError::Malformed] {
            assert_eq!(error.to_string(), "Bearer token invalid");
        }
    }

    #[test]
    fn test_from_config_uses_configured_expiry() {
        let config = Config::from_lookup(|key| match key {
            "TOKEN_EXPIRATION_TIME_MINUTES" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        let service = JwtTokenService::from_config(&config);
        let issued = service.issue("some@email.com").unwrap();

        assert_eq!(issued.expires_at - issued.issued_at, Duration::minutes(5));
    }
}
