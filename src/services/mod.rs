//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure. They depend on
//! traits so each collaborator can be substituted in tests.

mod account_service;
mod authenticator;
mod token_service;

pub use account_service::{AccountManager, AccountService};
pub use authenticator::{resolve_token, RequestAuthenticator};
pub use token_service::{AuthError, JwtTokenService, SigningError, TokenService};

#[cfg(any(test, feature = "test-utils"))]
pub use account_service::MockAccountService;
#[cfg(any(test, feature = "test-utils"))]
pub use token_service::MockTokenService;
