//! Domain layer - Core business entities and logic
//!
//! Accounts, credentials, sessions and the validation vocabulary shared by
//! every layer. Nothing here knows about HTTP or the database.

pub mod account;
pub mod password;
pub mod session;
pub mod validation;

pub use account::{Account, AccountId, AccountView, NewAccount};
pub use password::{BcryptHasher, CredentialHasher, HashingError};
pub use session::SessionClaims;
pub use validation::{FieldErrors, Outcome, ValidationErrors};

#[cfg(any(test, feature = "test-utils"))]
pub use password::MockCredentialHasher;
