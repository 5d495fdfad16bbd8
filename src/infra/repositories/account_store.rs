//! Persistence port for user accounts.

use async_trait::async_trait;
use sea_orm::DbErr;
use thiserror::Error;

use crate::domain::{Account, AccountId, Outcome};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Storage failures. Opaque to end users.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("unique constraint violated on {0}")]
    UniqueViolation(&'static str),

    #[error("scoped transactions are only available in test-runner mode")]
    ScopeUnavailable,
}

/// Account store trait for dependency injection.
///
/// `create_account` and `update_account` run record-level validation and return
/// [`Outcome::Rejected`] without writing anything when it fails. Lookups return
/// `Ok(None)` for a missing account.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account, returning its storage-assigned id
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Outcome<AccountId>, StoreError>;

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    /// Persist every mutable field of `account`
    async fn update_account(&self, account: &Account) -> Result<Outcome<()>, StoreError>;

    /// Remove the record entirely
    async fn delete_account(&self, account: &Account) -> Result<(), StoreError>;
}
