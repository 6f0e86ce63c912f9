use crate::AppState;
use crate::api::handlers::{admin, auth, health, sessions};
use crate::api::openapi::ApiDoc;
use crate::auth::{
    middleware::{auth_middleware, require_role},
    rate_limit::rate_limit_middleware,
};
use crate::types::{AppError, Role};
use axum::{
    Json, Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use utoipa::OpenApi;

/// Builds the full application.
///
/// Layers, outermost first: panic recovery, trace, rate limiter, then the
/// bearer-token check on protected routes and the role gate on admin routes.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/api-docs/openapi.json", get(openapi_json));

    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route_layer(middleware::from_fn_with_state(Role::Admin, require_role));

    let protected_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route(
            "/users/{user_id}/sessions",
            get(sessions::list_user_sessions),
        )
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(
            state.token_issuer.clone(),
            auth_middleware,
        ));

    public_routes
        .merge(protected_routes)
        .layer(middleware::from_fn_with_state(
            state.rate_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Turns a handler panic into the standard `INTERNAL_ERROR` envelope.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    tracing::error!(panic = detail, "request handler panicked");

    AppError::Internal("Internal server error".to_string()).into_response()
}
