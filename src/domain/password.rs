//! Credential hashing - one-way password hashing and verification.
//!
//! bcrypt only reads the first 72 bytes of its input. Longer passwords are
//! rejected with [`HashingError::TooLong`] instead of being silently truncated.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{MAX_BCRYPT_COST, MAX_PASSWORD_BYTES, MIN_BCRYPT_COST};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Failures while deriving a password hash.
#[derive(Debug, Error)]
pub enum HashingError {
    #[error("password is {0} bytes, bcrypt accepts at most 72")]
    TooLong(usize),

    #[error("bcrypt failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task failed: {0}")]
    Task(String),
}

/// Password hashing port.
///
/// `verify` never fails: a malformed hash or a wrong password is simply `false`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Derive a salted, algorithm-tagged hash of `password`.
    async fn hash(&self, password: &str) -> Result<String, HashingError>;

    /// Check `password` against a stored hash.
    async fn verify(&self, hash: &str, password: &str) -> bool;
}

/// bcrypt-backed [`CredentialHasher`].
///
/// Hashing is CPU-bound, so both operations run on the blocking thread pool.
#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a hasher with the given work factor, clamped to bcrypt's accepted range.
    pub fn new(cost: u32) -> Self {
        Self {
            cost: cost.clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

#[async_trait]
impl CredentialHasher for BcryptHasher {
    async fn hash(&self, password: &str) -> Result<String, HashingError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(HashingError::TooLong(password.len()));
        }

        let password = password.to_string();
        let cost = self.cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost).map_err(HashingError::from))
            .await
            .map_err(|e| HashingError::Task(e.to_string()))?
    }

    async fn verify(&self, hash: &str, password: &str) -> bool {
        // Never hashed by us, and bcrypt would only compare the prefix
        if password.len() > MAX_PASSWORD_BYTES {
            return false;
        }

        let password = password.to_string();
        let hash = hash.to_string();
        match tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                tracing::debug!("Stored hash could not be parsed: {}", e);
                false
            }
            Err(e) => {
                tracing::error!("Password verification task failed: {}", e);
                false
            }
        }
    }
}
