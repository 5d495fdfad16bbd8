//! Apps composed behind the HTTP engine.
//!
//! Each app owns its storage and routes. The engine initialises every app in
//! order and merges their routers; one failing app aborts startup.

use async_trait::async_trait;
use axum::Router;

use crate::config::Config;
use crate::errors::AppResult;

mod users;

pub use users::UsersApp;

#[async_trait]
pub trait App: Send + Sync {
    fn name(&self) -> &'static str;

    /// Connect storage and wire services.
    async fn initialise(&mut self, config: &Config) -> AppResult<()>;

    /// Routes served by this app. Fails if called before [`App::initialise`].
    fn router(&self) -> AppResult<Router>;
}

/// Initialise every app, returning their routers in the same order.
pub async fn initialise_apps(apps: &mut [Box<dyn App>], config: &Config) -> AppResult<Vec<Router>> {
    let mut routers = Vec::with_capacity(apps.len());

    for app in apps.iter_mut() {
        if let Err(e) = app.initialise(config).await {
            tracing::error!(app = app.name(), "Failed to initialise: {:?}", e);
            return Err(e);
        }
        routers.push(app.router()?);
        tracing::info!(app = app.name(), "App initialised");
    }

    Ok(routers)
}
