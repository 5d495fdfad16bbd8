//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::user_handler;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{AccountView, FieldErrors, NewAccount};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lines",
        version = "0.1.0",
        description = "Account creation, sign-in and session refresh",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        user_handler::sign_up,
        user_handler::sign_in,
        user_handler::sign_out,
        user_handler::refresh_token,
        user_handler::me,
        user_handler::change_password,
    ),
    components(
        schemas(
            NewAccount,
            AccountView,
            FieldErrors,
            user_handler::SignInRequest,
            user_handler::ChangePasswordRequest,
            user_handler::SessionResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Users", description = "Accounts and sessions")
    )
)]
pub struct ApiDoc;

/// Session token accepted either as a bearer header or as the session cookie
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token returned by /users/sign-in"))
                        .build(),
                ),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE_NAME))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_user_routes() {
        let doc = ApiDoc::openapi();

        for path in ["/users/sign-up", "/users/sign-in", "/users/me/password"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
