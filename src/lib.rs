//! # Practica - training-program tracker backend
//!
//! The authentication and authorization core of a training-program tracker:
//! students log practice sessions against programs, and administrators
//! oversee every student.
//!
//! ## Overview
//!
//! Practica can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `practica-server` binary
//! 2. **As a library** - Embed the auth core in another axum service
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use practica::{AppConfig, AppState, CredentialHasher, TokenIssuer, auth::TokenSettings};
//! use practica::db::{InMemorySessionStore, InMemoryUserStore};
//! use std::sync::Arc;
//!
//! let config = AppConfig::load("practica.toml")?;
//! let issuer = TokenIssuer::new(&config.jwt_secret()?, TokenSettings::try_from(&config.auth)?)?;
//!
//! let state = AppState::new(
//!     &config,
//!     issuer,
//!     Arc::new(InMemoryUserStore::new()),
//!     Arc::new(InMemorySessionStore::new()),
//!     CredentialHasher::default(),
//! );
//! let app = practica::api::routes::create_router(state);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - REST handlers, routes and the OpenAPI document
//! - [`auth`] - password hashing, tokens, rate limiting, middleware
//! - [`policy`] - access rules and the session read service
//! - [`db`] - repository traits and in-memory stores
//! - [`types`] - domain types and error handling
//! - [`utils`] - TOML configuration

#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Credentials, JWT tokens, rate limiting and middleware.
pub mod auth;
/// Repository traits and in-memory implementations.
pub mod db;
/// Authorization rules.
pub mod policy;
/// Core types (requests, responses, errors).
pub mod types;
/// Configuration utilities (TOML).
pub mod utils;

// Re-export commonly used types
pub use auth::{AuthService, CredentialHasher, RateLimiter, TokenIssuer};
pub use policy::SessionService;
pub use types::{AppError, Result};
pub use utils::config::AppConfig;

use db::{SessionRepository, UserRepository};
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Issues and verifies access/refresh tokens
    pub token_issuer: Arc<TokenIssuer>,
    /// Login, registration and refresh
    pub auth_service: Arc<AuthService>,
    /// Access-checked session reads
    pub session_service: Arc<SessionService>,
    /// User store
    pub users: Arc<dyn UserRepository>,
    /// Per-client request limiter; clones share buckets
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Wires the services together from their collaborators.
    pub fn new(
        config: &AppConfig,
        issuer: TokenIssuer,
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        hasher: CredentialHasher,
    ) -> Self {
        let token_issuer = Arc::new(issuer);
        let auth_service = Arc::new(AuthService::new(
            users.clone(),
            Arc::new(hasher),
            token_issuer.clone(),
        ));
        let session_service = Arc::new(SessionService::new(
            sessions,
            config.pagination.clone(),
        ));
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);

        Self {
            token_issuer,
            auth_service,
            session_service,
            users,
            rate_limiter,
        }
    }
}
