//! Shared setup for the end-to-end tests.

#![allow(dead_code)]

pub mod mocks;

use argon2::Params;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use mocks::CountingSessionRepository;
use practica::{
    AppConfig, AppState, CredentialHasher, TokenIssuer,
    auth::TokenSettings,
    db::{InMemoryUserStore, SessionRepository},
    types::{Identity, PracticeSession, Role},
};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const PASSWORD: &str = "correct horse battery";

/// Argon2 with minimal cost so tests stay fast.
pub fn fast_hasher() -> CredentialHasher {
    CredentialHasher::with_params(Params::new(1024, 1, 1, None).expect("valid params"))
}

pub struct TestApp {
    pub server: TestServer,
    pub state: AppState,
    pub sessions: Arc<CountingSessionRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_sessions(CountingSessionRepository::new())
    }

    pub fn with_sessions(sessions: Arc<CountingSessionRepository>) -> Self {
        Self::build(AppConfig::default(), sessions)
    }

    pub fn build(config: AppConfig, sessions: Arc<CountingSessionRepository>) -> Self {
        let settings = TokenSettings::try_from(&config.auth).expect("valid token settings");
        let issuer = TokenIssuer::new(TEST_SECRET, settings).expect("test issuer should build");
        let repo: Arc<dyn SessionRepository> = sessions.clone();
        let state = AppState::new(
            &config,
            issuer,
            Arc::new(InMemoryUserStore::new()),
            repo,
            fast_hasher(),
        );

        let app = practica::api::routes::create_router(state.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            state,
            sessions,
        }
    }

    /// Creates a user directly through the service and returns its identity.
    pub async fn create_user(&self, email: &str, role: Role) -> Identity {
        self.state
            .auth_service
            .create_user(email, PASSWORD, "Test User", role)
            .await
            .expect("user creation should succeed")
    }

    /// Logs in over HTTP and returns the token pair body.
    pub async fn login(&self, email: &str) -> Value {
        let response = self
            .server
            .post("/auth/login")
            .json(&json!({ "email": email, "password": PASSWORD }))
            .await;
        response.assert_status_ok();
        response.json()
    }

    pub async fn access_token(&self, email: &str, role: Role) -> (Identity, String) {
        let identity = self.create_user(email, role).await;
        let tokens = self.login(email).await;
        let access = tokens["access_token"]
            .as_str()
            .expect("access_token present")
            .to_string();
        (identity, access)
    }
}

pub fn session_for(user_id: Uuid, started_at: DateTime<Utc>) -> PracticeSession {
    PracticeSession {
        id: Uuid::new_v4(),
        user_id,
        program_id: Uuid::new_v4(),
        started_at,
        duration_secs: 1200,
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
