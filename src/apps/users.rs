//! User-management app: accounts, sign-in and sessions under `/users`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use super::App;
use crate::api::handlers::user_routes;
use crate::api::{AppState, CookieSettings};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{AccountStore, Database, MemoryAccountStore, SeaOrmAccountStore, StoreError};
use crate::services::AccountManager;

pub struct UsersApp {
    in_memory: bool,
    state: Option<AppState>,
}

impl UsersApp {
    /// `in_memory` swaps Postgres for a process-local store.
    pub fn new(in_memory: bool) -> Self {
        Self {
            in_memory,
            state: None,
        }
    }

    /// Already-initialised app over the given state.
    pub fn with_state(state: AppState) -> Self {
        Self {
            in_memory: true,
            state: Some(state),
        }
    }

    async fn open_store(&self, config: &Config) -> Result<Arc<dyn AccountStore>, StoreError> {
        if self.in_memory {
            tracing::warn!("Using in-memory account store; accounts are lost on restart");
            return Ok(Arc::new(MemoryAccountStore::new(config.test_runner)));
        }

        let database = Database::connect(&config.database_url).await?;
        Ok(Arc::new(SeaOrmAccountStore::new(
            database.into_connection(),
            config.test_runner,
        )))
    }
}

#[async_trait]
impl App for UsersApp {
    fn name(&self) -> &'static str {
        "users"
    }

    async fn initialise(&mut self, config: &Config) -> AppResult<()> {
        let store = self.open_store(config).await?;
        let accounts = AccountManager::from_config(store, config);

        self.state = Some(AppState::new(
            Arc::new(accounts),
            CookieSettings::from_config(config),
        ));
        Ok(())
    }

    fn router(&self) -> AppResult<Router> {
        let state = self
            .state
            .clone()
            .ok_or_else(|| AppError::internal("users app used before initialise"))?;

        Ok(Router::new().nest("/users", user_routes(state)))
    }
}
