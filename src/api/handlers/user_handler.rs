//! User handlers.

use axum::{
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    middleware,
    response::Json,
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{JsonBody, ValidatedJson};
use crate::api::middleware::auth_middleware;
use crate::api::AppState;
use crate::domain::{AccountView, NewAccount, Outcome, SessionClaims};
use crate::errors::{AppError, AppResult};
use crate::services::AuthError;

/// Sign-in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignInRequest {
    /// Account email address
    #[validate(length(min = 1, message = "Email is required."))]
    #[schema(example = "some@email.com")]
    pub email: String,
    /// Account password
    #[validate(length(min = 1, message = "Password is required."))]
    #[schema(example = "password")]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    /// Current password
    pub old_password: String,
    /// Replacement password
    pub new_password: String,
}

/// Session issued by sign-in and refresh
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Signed session token, also set as the `Bearer` cookie
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = "some@email.com")]
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionClaims> for SessionResponse {
    fn from(claims: SessionClaims) -> Self {
        Self {
            token: claims.token,
            email: claims.email,
            issued_at: claims.issued_at,
            expires_at: claims.expires_at,
        }
    }
}

/// Create user routes. Everything except sign-up, sign-in and sign-out needs a session.
pub fn user_routes(state: AppState) -> Router {
    let protected = Router::new()
        .route("/refresh-token", get(refresh_token))
        .route("/me", get(me))
        .route("/me/password", put(change_password))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
        .route("/sign-out", post(sign_out))
        .merge(protected)
        .with_state(state)
}

/// Create an account
#[utoipa::path(
    post,
    path = "/users/sign-up",
    tag = "Users",
    request_body = NewAccount,
    responses(
        (status = 201, description = "Account created", body = AccountView),
        (status = 400, description = "Malformed body or validation errors"),
        (status = 500, description = "Account could not be stored")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<NewAccount>,
) -> AppResult<(StatusCode, Json<AccountView>)> {
    match state.accounts.sign_up(payload).await? {
        Outcome::Accepted(view) => Ok((StatusCode::CREATED, Json(view))),
        Outcome::Rejected(errors) => Err(AppError::Validation(errors)),
    }
}

/// Exchange credentials for a session
#[utoipa::path(
    post,
    path = "/users/sign-in",
    tag = "Users",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = SessionResponse),
        (status = 400, description = "Malformed body or missing fields"),
        (status = 401, description = "Credentials not recognised")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignInRequest>,
) -> AppResult<(CookieJar, Json<SessionResponse>)> {
    let claims = state
        .accounts
        .sign_in(&payload.email, &payload.password)
        .await?;

    let jar = jar.add(state.cookies.session_cookie(&claims));
    Ok((jar, Json(SessionResponse::from(claims))))
}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/users/sign-out",
    tag = "Users",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
pub async fn sign_out(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    (jar.add(state.cookies.clear_cookie()), StatusCode::OK)
}

/// Issue a new session for the current one
#[utoipa::path(
    get,
    path = "/users/refresh-token",
    tag = "Users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "New session; cookie refreshed", body = SessionResponse),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<SessionResponse>)> {
    let claims = state.accounts.refresh(&headers).await?;

    let jar = jar.add(state.cookies.session_cookie(&claims));
    Ok((jar, Json(SessionResponse::from(claims))))
}

/// Get the signed-in account
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = AccountView),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub async fn me(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<AppState>,
) -> AppResult<Json<AccountView>> {
    // A valid token can outlive its account
    let view = state
        .accounts
        .get_by_email(&claims.email)
        .await?
        .ok_or(AuthError::Unauthorised)?;

    Ok(Json(view))
}

/// Change the signed-in account's password
#[utoipa::path(
    put,
    path = "/users/me/password",
    tag = "Users",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Old password incorrect or new password invalid"),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub async fn change_password(
    Extension(claims): Extension<SessionClaims>,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    let account = state
        .accounts
        .get_by_email(&claims.email)
        .await?
        .ok_or(AuthError::Unauthorised)?;

    match state
        .accounts
        .change_password(account.id, &payload.old_password, &payload.new_password)
        .await?
    {
        Outcome::Accepted(()) => Ok(StatusCode::NO_CONTENT),
        Outcome::Rejected(errors) => Err(AppError::Validation(errors)),
    }
}
