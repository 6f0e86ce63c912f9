use crate::api::handlers;
use crate::types::{
    ErrorBody, ErrorEnvelope, Identity, LoginRequest, PracticeSession, RefreshRequest,
    RegisterRequest, Role, SessionsResponse, TokenPair, UserSummary,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Practica API",
        description = "Authentication and access-checked practice session reads"
    ),
    paths(
        handlers::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh_token,
        handlers::auth::logout,
        handlers::auth::me,
        handlers::sessions::list_user_sessions,
        handlers::admin::list_users,
    ),
    components(schemas(
        Role,
        Identity,
        TokenPair,
        LoginRequest,
        RegisterRequest,
        RefreshRequest,
        UserSummary,
        PracticeSession,
        SessionsResponse,
        ErrorEnvelope,
        ErrorBody,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Login, registration and token rotation"),
        (name = "sessions", description = "Practice session history"),
        (name = "admin", description = "Administrator endpoints"),
        (name = "system", description = "Health checks")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/auth/register",
            "/auth/login",
            "/auth/refresh",
            "/auth/logout",
            "/auth/me",
            "/users/{user_id}/sessions",
            "/admin/users",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
