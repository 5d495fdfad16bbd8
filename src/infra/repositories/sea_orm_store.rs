//! SeaORM implementation of the account store.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbErr,
    EntityTrait, QueryFilter, Set, SqlErr, TransactionTrait,
};

use super::account_store::{AccountStore, StoreError};
use super::entities::account::{self, EMAIL_UNIQUE_INDEX};
use super::entities::{AccountActiveModel, AccountEntity};
use crate::domain::{Account, AccountId, Outcome};

/// Account store over any SeaORM connection.
///
/// `C` is a pooled [`sea_orm::DatabaseConnection`] in production and a
/// [`DatabaseTransaction`] inside a test scope.
pub struct SeaOrmAccountStore<C> {
    conn: C,
    test_runner: bool,
}

impl<C> SeaOrmAccountStore<C> {
    pub fn new(conn: C, test_runner: bool) -> Self {
        Self { conn, test_runner }
    }
}

impl<C: TransactionTrait> SeaOrmAccountStore<C> {
    /// Open a transaction that the caller later discards with [`Self::rollback_scope`].
    ///
    /// Refused unless the store was opened in test-runner mode.
    pub async fn begin_scope(&self) -> Result<SeaOrmAccountStore<DatabaseTransaction>, StoreError> {
        if !self.test_runner {
            return Err(StoreError::ScopeUnavailable);
        }

        let txn = self.conn.begin().await?;
        Ok(SeaOrmAccountStore::new(txn, true))
    }
}

impl SeaOrmAccountStore<DatabaseTransaction> {
    /// Discard every write made inside this scope.
    pub async fn rollback_scope(self) -> Result<(), StoreError> {
        self.conn.rollback().await?;
        Ok(())
    }
}

/// A concurrent sign-up can pass the uniqueness check and still lose at the index.
fn map_write_error(err: DbErr) -> StoreError {
    let violated = match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => Some(detail),
        // Errors not raised by a sqlx driver only carry the constraint in their text
        _ => {
            let message = err.to_string();
            message.contains(EMAIL_UNIQUE_INDEX).then_some(message)
        }
    };

    match violated {
        Some(detail) => {
            tracing::warn!("Unique constraint violated: {}", detail);
            StoreError::UniqueViolation("email")
        }
        None => StoreError::Database(err),
    }
}

#[async_trait]
impl<C> AccountStore for SeaOrmAccountStore<C>
where
    C: ConnectionTrait + Send + Sync,
{
    async fn create_account(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<Outcome<AccountId>, StoreError> {
        let errors = Account::validate_record(name, email, password_hash);
        if !errors.is_empty() {
            return Ok(Outcome::Rejected(errors));
        }

        let now = Utc::now();
        let active_model = AccountActiveModel {
            id: ActiveValue::NotSet,
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.conn).await.map_err(map_write_error)?;
        Ok(Outcome::Accepted(model.id))
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let result = AccountEntity::find()
            .filter(account::Column::Email.eq(email))
            .one(&self.conn)
            .await?;

        Ok(result.map(Account::from))
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let result = AccountEntity::find_by_id(id).one(&self.conn).await?;

        Ok(result.map(Account::from))
    }

    async fn update_account(&self, account: &Account) -> Result<Outcome<()>, StoreError> {
        let errors = account.validate();
        if !errors.is_empty() {
            return Ok(Outcome::Rejected(errors));
        }

        let active = AccountActiveModel {
            id: Set(account.id),
            name: Set(account.name.clone()),
            email: Set(account.email.clone()),
            password_hash: Set(account.password_hash.clone()),
            created_at: ActiveValue::NotSet,
            updated_at: Set(Utc::now()),
        };

        active.update(&self.conn).await.map_err(map_write_error)?;
        Ok(Outcome::Accepted(()))
    }

    async fn delete_account(&self, account: &Account) -> Result<(), StoreError> {
        AccountEntity::delete_by_id(account.id).exec(&self.conn).await?;
        Ok(())
    }
}
