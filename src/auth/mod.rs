//! Authentication: credentials, tokens, and request gating
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id password hashing
//! - [`auth::jwt`](crate::auth::jwt) - access/refresh token issuance and verification
//! - [`auth::middleware`](crate::auth::middleware) - bearer-token middleware, role gate, extractor
//! - [`auth::rate_limit`](crate::auth::rate_limit) - fixed-window per-client limiter
//! - [`auth::service`](crate::auth::service) - login, registration, refresh
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id (memory-hard), PHC strings with embedded salt
//! - **JWT Tokens**: HS256, `typ` claim separates access from refresh tokens,
//!   60s default clock-skew leeway on expiry
//! - **Secrets**: signing secrets shorter than 32 characters are refused at startup
//!
//! # Logout
//!
//! There is no server-side session state. Logout means the client discards
//! its tokens; an access token stays valid until it expires and a refresh
//! token until it is rotated or expires.
//!
//! TODO: add a `jti` denylist so logout and role downgrades can revoke
//! outstanding tokens before they expire.
//!
//! # Configuration
//!
//! Configure via `practica.toml`:
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"     # env var holding a >= 32 char secret
//! access_token_expiry_hours = 24
//! refresh_token_expiry_days = 7
//! clock_skew_leeway_secs = 60
//! ```

mod error;
/// JWT token generation and validation.
pub mod jwt;
/// Authentication middleware and extractors for protected routes.
pub mod middleware;
/// Password hashing.
pub mod password;
/// Request rate limiting.
pub mod rate_limit;
/// Login, registration and refresh flows.
pub mod service;

pub use error::{AuthError, TokenError};
pub use jwt::{TokenIssuer, TokenSettings};
pub use password::{CredentialHasher, CredentialHashing, HashingError};
pub use rate_limit::RateLimiter;
pub use service::AuthService;
