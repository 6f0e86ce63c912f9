use crate::auth::{AuthError, jwt::TokenIssuer};
use crate::types::{AppError, Identity, Role, TokenType};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

/// Verifies the bearer access token and attaches its [`Identity`] to the
/// request. Any failure is a 401; the reason is only logged.
pub async fn auth_middleware(
    State(issuer): State<Arc<TokenIssuer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = match authenticate(&issuer, req.headers()) {
        Ok(identity) => identity,
        Err(err) => {
            warn!(
                reason = err.reason_code(),
                path = %req.uri().path(),
                "authentication failed"
            );
            return Err(err.into());
        }
    };

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

fn authenticate(issuer: &TokenIssuer, headers: &HeaderMap) -> Result<Identity, AuthError> {
    let token = extract_bearer(headers)?;
    Ok(issuer.verify(token, TokenType::Access)?)
}

/// Pulls the token out of `Authorization: Bearer <token>`. The scheme name
/// is case-insensitive.
pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?;

    let value = value.to_str().map_err(|_| AuthError::MalformedHeader)?;

    let (scheme, token) = value
        .trim_start()
        .split_once(' ')
        .ok_or(AuthError::MalformedHeader)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::MalformedHeader);
    }
    let token = token.trim();

    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}

/// Role gate, layered inside [`auth_middleware`]:
///
/// ```ignore
/// Router::new()
///     .route("/admin/users", get(list_users))
///     .route_layer(middleware::from_fn_with_state(Role::Admin, require_role))
///     .route_layer(middleware::from_fn_with_state(issuer, auth_middleware));
/// ```
pub async fn require_role(
    State(required): State<Role>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = req
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or(AuthError::MissingIdentity)?;

    if identity.role != required {
        warn!(
            user_id = %identity.id,
            role = %identity.role,
            required = %required,
            "role check failed"
        );
        return Err(AppError::Forbidden(
            "You don't have permission to access this resource".to_string(),
        ));
    }

    Ok(next.run(req).await)
}

/// Extractor for the identity attached by [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Identity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .map(AuthUser)
            .ok_or_else(|| AuthError::MissingIdentity.into())
    }
}
