//! Account domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::ValidationErrors;

/// Storage-assigned account identifier
pub type AccountId = i32;

/// Account domain entity
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Don't expose hash in debug output
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl Account {
    /// Replace the stored password hash.
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.updated_at = Utc::now();
    }

    /// Record-level checks applied by every store before writing.
    pub fn validate_record(name: &str, email: &str, password_hash: &str) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if name.is_empty() {
            errors.add("name", "Name is required");
        }
        if email.is_empty() {
            errors.add("email", "Email is required");
        }
        if password_hash.is_empty() {
            errors.add("password", "Password is required");
        }
        errors
    }

    /// Record-level checks for an existing account.
    pub fn validate(&self) -> ValidationErrors {
        Self::validate_record(&self.name, &self.email, &self.password_hash)
    }
}

/// Sign-up input
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewAccount {
    /// Display name
    #[schema(example = "Jake")]
    pub name: String,
    /// Email address, unique across accounts
    #[schema(example = "some@email.com")]
    pub email: String,
    /// Plaintext password, hashed before storage
    #[schema(example = "password")]
    pub password: String,
}

impl NewAccount {
    /// Shape checks, accumulated across every field.
    pub fn validate(&self) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require_email("email", &self.email);
        errors.require("password", &self.password);
        errors.require_password_length("password", &self.password);
        errors
    }
}

/// Account view (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AccountView {
    /// Account identifier
    #[schema(example = 1)]
    pub id: AccountId,
    /// Display name
    #[schema(example = "Jake")]
    pub name: String,
    /// Email address
    #[schema(example = "some@email.com")]
    pub email: String,
}

impl From<Account> for AccountView {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
        }
    }
}
