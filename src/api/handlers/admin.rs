use crate::{
    AppState,
    types::{ErrorEnvelope, Result, UserSummary},
};
use axum::{Json, extract::State};

/// List all users (admin only)
#[utoipa::path(
    get,
    path = "/admin/users",
    responses(
        (status = 200, description = "All users", body = [UserSummary]),
        (status = 401, description = "Missing or invalid access token", body = ErrorEnvelope),
        (status = 403, description = "Caller is not an admin", body = ErrorEnvelope)
    ),
    security(("bearer" = [])),
    tag = "admin"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserSummary>>> {
    let users = state.users.list().await?;
    Ok(Json(users.iter().map(|u| u.summary()).collect()))
}
