//! Infrastructure layer - External systems integration
//!
//! Database connections, migrations and the account store adapters.

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{AccountStore, MemoryAccountStore, SeaOrmAccountStore, StoreError};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::MockAccountStore;
