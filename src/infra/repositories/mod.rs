//! Repository layer - Data access abstraction
//!
//! The [`AccountStore`] port and its two adapters: SeaORM over Postgres, and an
//! in-memory map for local development and tests.

mod account_store;
pub(crate) mod entities;
mod memory_store;
mod sea_orm_store;

pub use account_store::{AccountStore, StoreError};
pub use memory_store::MemoryAccountStore;
pub use sea_orm_store::SeaOrmAccountStore;

// Export mock for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use account_store::MockAccountStore;
