//! API layer - HTTP handlers and middleware
//!
//! Handlers, the session middleware, extractors, cookies and the engine that
//! merges app routers.

pub mod cookies;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use cookies::CookieSettings;
pub use openapi::ApiDoc;
pub use routes::create_engine;
pub use state::AppState;
