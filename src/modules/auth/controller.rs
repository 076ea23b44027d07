use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use tracing::instrument;

use crate::middleware::auth::bearer_token;
use crate::modules::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::error::AuthError;
use super::model::{AuthResponse, LoginRequest, RegisterRequest};
use super::service::AuthService;

/// Register a new customer account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Malformed or invalid body, or username/email already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let user = AuthService::register(state.users.as_ref(), dto).await?;
    Ok(Json(AuthResponse {
        message: "User registered successfully".to_string(),
        token: None,
        username: user.username,
        role: user.role,
    }))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Invalid username or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let (user, token) = AuthService::login(state.users.as_ref(), &state.tokens, dto).await?;
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token: Some(token),
        username: user.username,
        role: user.role,
    }))
}

/// Check a bearer token and report who it belongs to
#[utoipa::path(
    post,
    path = "/api/auth/validate",
    responses(
        (status = 200, description = "Token is valid", body = AuthResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip_all)]
pub async fn validate_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthResponse>, AuthError> {
    let token = bearer_token(&headers).ok_or(AuthError::MissingToken)?;
    let principal =
        AuthService::resolve_principal(state.users.as_ref(), &state.tokens, &token).await?;

    Ok(Json(AuthResponse {
        message: "Token is valid".to_string(),
        token: Some(token),
        username: principal.username,
        role: principal.role,
    }))
}
