use super::JsonBody;
use crate::{
    AppState,
    auth::middleware::AuthUser,
    types::{
        ErrorEnvelope, Identity, LoginRequest, RefreshRequest, RegisterRequest, Result, TokenPair,
    },
};
use axum::{Json, extract::State, http::StatusCode};
use tracing::info;

/// Register a new student account
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered successfully", body = TokenPair),
        (status = 400, description = "Invalid input", body = ErrorEnvelope),
        (status = 409, description = "User already exists", body = ErrorEnvelope),
        (status = 429, description = "Rate limit exceeded", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RegisterRequest>,
) -> Result<Json<TokenPair>> {
    let tokens = state
        .auth_service
        .register(&payload.email, &payload.password, &payload.name)
        .await?;

    Ok(Json(tokens))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPair),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 429, description = "Rate limit exceeded", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LoginRequest>,
) -> Result<Json<TokenPair>> {
    let tokens = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(tokens))
}

/// Exchange a refresh token for a new token pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Tokens rotated", body = TokenPair),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorEnvelope)
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    let tokens = state.auth_service.refresh(&payload.refresh_token).await?;

    Ok(Json(tokens))
}

/// Logout. Tokens are discarded client-side; nothing changes on the server.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 204, description = "Client should discard its tokens"),
        (status = 401, description = "Missing or invalid access token", body = ErrorEnvelope)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn logout(AuthUser(identity): AuthUser) -> StatusCode {
    info!(user_id = %identity.id, "logout requested");
    StatusCode::NO_CONTENT
}

/// Identity carried by the current access token
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Missing or invalid access token", body = ErrorEnvelope)
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn me(AuthUser(identity): AuthUser) -> Json<Identity> {
    Json(identity)
}
