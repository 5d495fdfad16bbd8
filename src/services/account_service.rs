//! Account service - sign-up, sign-in, refresh and password changes.
//!
//! Composes the account store, the credential hasher and the token service.
//! Validation failures come back as [`Outcome::Rejected`]; only infrastructure
//! failures and authentication failures are errors.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::HeaderMap;
use tokio::sync::OnceCell;
use uuid::Uuid;

use super::authenticator::RequestAuthenticator;
use super::token_service::{JwtTokenService, TokenService};
use crate::config::{Config, MSG_EMAIL_IN_USE, MSG_OLD_PASSWORD_INCORRECT};
use crate::domain::{
    AccountId, AccountView, BcryptHasher, CredentialHasher, HashingError, NewAccount, Outcome,
    SessionClaims, ValidationErrors,
};
use crate::errors::{AppError, AppResult};
use crate::infra::AccountStore;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Validate and create an account. Storage is not touched when the input is malformed.
    async fn sign_up(&self, input: NewAccount) -> AppResult<Outcome<AccountView>>;

    /// Exchange credentials for a fresh session.
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionClaims>;

    /// Issue a new session for the subject of the request's current one.
    async fn refresh(&self, headers: &HeaderMap) -> AppResult<SessionClaims>;

    /// Replace the password after checking the current one.
    async fn change_password(
        &self,
        id: AccountId,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<Outcome<()>>;

    async fn get_by_id(&self, id: AccountId) -> AppResult<Option<AccountView>>;

    async fn get_by_email(&self, email: &str) -> AppResult<Option<AccountView>>;

    /// Remove the account. Deleting a missing account succeeds.
    async fn delete(&self, id: AccountId) -> AppResult<()>;

    /// Resolve the request to verified session claims.
    fn authenticate(&self, headers: &HeaderMap) -> AppResult<SessionClaims>;
}

/// Concrete implementation of [`AccountService`].
pub struct AccountManager {
    store: Arc<dyn AccountStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<dyn TokenService>,
    authenticator: RequestAuthenticator,
    /// Hash of a random secret at the hasher's cost, verified against for unknown emails
    unknown_account_hash: OnceCell<String>,
}

impl AccountManager {
    pub fn new(
        store: Arc<dyn AccountStore>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let authenticator = RequestAuthenticator::new(Arc::clone(&tokens));
        Self {
            store,
            hasher,
            tokens,
            authenticator,
            unknown_account_hash: OnceCell::new(),
        }
    }

    /// Wire the bcrypt hasher and JWT token service from configuration.
    pub fn from_config(store: Arc<dyn AccountStore>, config: &Config) -> Self {
        Self::new(
            store,
            Arc::new(BcryptHasher::new(config.bcrypt_cost)),
            Arc::new(JwtTokenService::from_config(config)),
        )
    }

    async fn unknown_account_hash(&self) -> Result<&str, HashingError> {
        self.unknown_account_hash
            .get_or_try_init(|| async {
                let secret = Uuid::new_v4().to_string();
                self.hasher.hash(&secret).await
            })
            .await
            .map(String::as_str)
    }
}

#[async_trait]
impl AccountService for AccountManager {
    #[tracing::instrument(skip(self, input), fields(email = %input.email))]
    async fn sign_up(&self, input: NewAccount) -> AppResult<Outcome<AccountView>> {
        let errors = input.validate();
        if !errors.is_empty() {
            return Ok(Outcome::Rejected(errors));
        }

        if self.store.get_account_by_email(&input.email).await?.is_some() {
            return Ok(Outcome::Rejected(ValidationErrors::single(
                "email",
                MSG_EMAIL_IN_USE,
            )));
        }

        let password_hash = self.hasher.hash(&input.password).await?;

        let outcome = self
            .store
            .create_account(&input.name, &input.email, &password_hash)
            .await?;

        if let Outcome::Accepted(id) = &outcome {
            tracing::info!(account_id = *id, "Account created");
        }

        Ok(outcome.map(|id| AccountView {
            id,
            name: input.name,
            email: input.email,
        }))
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionClaims> {
        let account = match self.store.get_account_by_email(email).await {
            Ok(account) => account,
            Err(e) => {
                tracing::warn!("Account lookup failed during sign-in: {}", e);
                None
            }
        };

        let password_valid = match &account {
            Some(account) => self.hasher.verify(&account.password_hash, password).await,
            None => {
                // Verify anyway so response time does not reveal which emails exist
                match self.unknown_account_hash().await {
                    Ok(hash) => {
                        self.hasher.verify(hash, password).await;
                    }
                    Err(e) => tracing::error!("Could not derive unknown-account hash: {}", e),
                }
                false
            }
        };

        let account = match account {
            Some(account) if password_valid => account,
            _ => return Err(AppError::InvalidCredentials),
        };

        Ok(self.tokens.issue(&account.email)?)
    }

    #[tracing::instrument(skip_all)]
    async fn refresh(&self, headers: &HeaderMap) -> AppResult<SessionClaims> {
        let claims = self.authenticator.authenticate(headers)?;
        Ok(self.tokens.issue(&claims.email)?)
    }

    #[tracing::instrument(skip(self, old_password, new_password))]
    async fn change_password(
        &self,
        id: AccountId,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<Outcome<()>> {
        let mut account = self
            .store
            .get_account_by_id(id)
            .await?
            .ok_or(AppError::NotFound)?;

        if !self.hasher.verify(&account.password_hash, old_password).await {
            return Ok(Outcome::Rejected(ValidationErrors::single(
                "old_password",
                MSG_OLD_PASSWORD_INCORRECT,
            )));
        }

        let mut errors = ValidationErrors::new();
        errors.require("new_password", new_password);
        errors.require_password_length("new_password", new_password);
        if !errors.is_empty() {
            return Ok(Outcome::Rejected(errors));
        }

        let password_hash = self.hasher.hash(new_password).await?;

        account.set_password_hash(password_hash);
        Ok(self.store.update_account(&account).await?)
    }

    async fn get_by_id(&self, id: AccountId) -> AppResult<Option<AccountView>> {
        Ok(self.store.get_account_by_id(id).await?.map(AccountView::from))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<AccountView>> {
        Ok(self
            .store
            .get_account_by_email(email)
            .await?
            .map(AccountView::from))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: AccountId) -> AppResult<()> {
        if let Some(account) = self.store.get_account_by_id(id).await? {
            self.store.delete_account(&account).await?;
        }
        Ok(())
    }

    fn authenticate(&self, headers: &HeaderMap) -> AppResult<SessionClaims> {
        Ok(self.authenticator.authenticate(headers)?)
    }
}
