//! Application state shared by the user routes.

use std::sync::Arc;

use super::cookies::CookieSettings;
use crate::services::AccountService;

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountService>,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(accounts: Arc<dyn AccountService>, cookies: CookieSettings) -> Self {
        Self { accounts, cookies }
    }
}
