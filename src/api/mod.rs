//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer for Practica, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and middleware stack
//! - [`api::openapi`](crate::api::openapi) - Generated OpenAPI document
//!
//! # API Endpoints
//!
//! ## Authentication (`/auth`)
//! - `POST /auth/register` - Register a new student
//! - `POST /auth/login` - Login and receive an access/refresh token pair
//! - `POST /auth/refresh` - Rotate a refresh token into a new pair
//! - `POST /auth/logout` - Acknowledge logout (204)
//! - `GET /auth/me` - Identity carried by the access token
//!
//! ## Sessions
//! - `GET /users/{user_id}/sessions` - Practice sessions, visible to the owner and admins
//!
//! ## Admin
//! - `GET /admin/users` - List users (admin role required)
//!
//! ## System
//! - `GET /health` - Health check endpoint
//! - `GET /api-docs/openapi.json` - OpenAPI document
//!
//! # Authentication
//!
//! Protected endpoints require an access token in the `Authorization` header:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! Every request, public or not, counts against the caller's rate limit.

/// Request and response handlers for all API endpoints.
pub mod handlers;
/// OpenAPI document.
pub mod openapi;
/// Router configuration and route definitions.
pub mod routes;
