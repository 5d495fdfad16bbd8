//! Session authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::api::AppState;
use crate::errors::AppError;

/// Resolve the request's session token (cookie first, then `Authorization`)
/// and inject the verified [`crate::domain::SessionClaims`] into the request
/// extensions. Rejects with 401 before the handler runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = state.accounts.authenticate(request.headers())?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}
