//! Lines - a monolith skeleton composing independent apps behind one HTTP engine.
//!
//! The single app today is user management: sign-up, sign-in with signed
//! session tokens, session refresh and password changes.
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: command-line entry points
//! - **config**: environment configuration and constants
//! - **domain**: accounts, credentials, sessions, validation
//! - **services**: account use cases, token issuance, request authentication
//! - **infra**: database, migrations and account stores
//! - **api**: HTTP handlers, middleware and the engine
//! - **apps**: apps mounted on the engine
//! - **errors**: centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Start without a database
//! cargo run -- serve --in-memory
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod apps;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use errors::{AppError, AppResult};
