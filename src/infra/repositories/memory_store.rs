//! In-memory account store for local development and tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::account_store::{AccountStore, StoreError};
use crate::domain::{Account, AccountId, Outcome};

#[derive(Debug, Clone)]
struct Table {
    next_id: AccountId,
    rows: BTreeMap<AccountId, Account>,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// Account store backed by a shared map.
///
/// Clones share the same table. Emails are unique, mirroring the database index.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    table: Arc<Mutex<Table>>,
    test_runner: bool,
    snapshot: Option<Table>,
}

impl MemoryAccountStore {
    pub fn new(test_runner: bool) -> Self {
        Self {
            test_runner,
            ..Self::default()
        }
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot the table so [`Self::rollback_scope`] can restore it.
    ///
    /// Refused unless the store was opened in test-runner mode.
    pub fn begin_scope(&self) -> Result<MemoryAccountStore, StoreError> {
        if !self.test_runner {
            return Err(StoreError::ScopeUnavailable);
        }

        Ok(Self {
            table: Arc::clone(&self.table),
            test_runner: true,
            snapshot: Some(self.table().clone()),
        })
    }

    /// Restore the table to its state when the scope began.
    pub fn rollback_scope(self) -> Result<(), StoreError> {
        let snapshot = self.snapshot.clone().ok_or(StoreError::ScopeUnavailable)?;
        *self.table() = snapshot;
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
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

        let mut table = self.table();
        if table.rows.values().any(|account| account.email == email) {
            return Err(StoreError::UniqueViolation("email"));
        }

        let id = table.next_id;
        table.next_id += 1;

        let now = Utc::now();
        table.rows.insert(
            id,
            Account {
                id,
                name: name.to_string(),
                email: email.to_string(),
                password_hash: password_hash.to_string(),
                created_at: now,
                updated_at: now,
            },
        );

        Ok(Outcome::Accepted(id))
    }

    async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        Ok(self
            .table()
            .rows
            .values()
            .find(|account| account.email == email)
            .cloned())
    }

    async fn get_account_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        Ok(self.table().rows.get(&id).cloned())
    }

    async fn update_account(&self, account: &Account) -> Result<Outcome<()>, StoreError> {
        let errors = account.validate();
        if !errors.is_empty() {
            return Ok(Outcome::Rejected(errors));
        }

        let mut table = self.table();
        if table
            .rows
            .values()
            .any(|other| other.id != account.id && other.email == account.email)
        {
            return Err(StoreError::UniqueViolation("email"));
        }

        let mut updated = account.clone();
        updated.updated_at = Utc::now();
        table.rows.insert(account.id, updated);

        Ok(Outcome::Accepted(()))
    }

    async fn delete_account(&self, account: &Account) -> Result<(), StoreError> {
        self.table().rows.remove(&account.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn create(store: &MemoryAccountStore, email: &str) -> AccountId {
        store
            .create_account("Jake", email, "$2b$04$hash")
            .await
            .unwrap()
            .into_result()
            .unwrap()
    }

    #[tokio::test]
    async fn test_ids_are_assigned_in_order() {
        let store = MemoryAccountStore::default();

        assert_eq!(create(&store, "a@email.com").await, 1);
        assert_eq!(create(&store, "b@email.com").await, 2);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_store_error() {
        let store = MemoryAccountStore::default();
        create(&store, "some@email.com").await;

        let result = store
            .create_account("Other", "some@email.com", "$2b$04$hash")
            .await;

        assert!(matches!(result, Err(StoreError::UniqueViolation("email"))));
    }

    #[tokio::test]
    async fn test_record_validation() {
        let store = MemoryAccountStore::default();

        let outcome = store.create_account("Jake", "", "hash").await.unwrap();

        assert_eq!(
            outcome.into_result().unwrap_err().field("email").unwrap(),
            ["Email is required"]
        );
        assert!(store.get_account_by_email("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_lookup_update_delete() {
        let store = MemoryAccountStore::default();
        let id = create(&store, "some@email.com").await;

        let mut account = store.get_account_by_email("some@email.com").await.unwrap().unwrap();
        assert_eq!(account.id, id);

        account.set_password_hash("$2b$04$other".to_string());
        assert!(store.update_account(&account).await.unwrap().is_accepted());
        let stored = store.get_account_by_id(id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, "$2b$04$other");

        store.delete_account(&stored).await.unwrap();
        assert!(store.get_account_by_id(id).await.unwrap().is_none());
        // Deleting again is not an error
        store.delete_account(&stored).await.unwrap();
    }

    #[tokio::test]
    async fn test_scope_rolls_back() {
        let store = MemoryAccountStore::new(true);
        create(&store, "kept@email.com").await;

        let scope = store.begin_scope().unwrap();
        create(&scope, "discarded@email.com").await;
        assert!(store
            .get_account_by_email("discarded@email.com")
            .await
            .unwrap()
            .is_some());

        scope.rollback_scope().unwrap();
        assert!(store
            .get_account_by_email("kept@email.com")
            .await
            .unwrap()
            .is_some());
        assert!(store
            .get_account_by_email("discarded@email.com")
            .await
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_scope_refused_outside_test_runner() {
        let store = MemoryAccountStore::new(false);
        assert!(matches!(store.begin_scope(), Err(StoreError::ScopeUnavailable)));
    }
}
