use crate::auth::{AuthError, TokenError, jwt::TokenIssuer, password::CredentialHashing};
use crate::db::{NewUser, UserRepository};
use crate::types::{AppError, Identity, Result, Role, TokenPair};
use std::sync::Arc;
use tracing::{error, info, warn};

const MIN_PASSWORD_LEN: usize = 8;

/// Login, registration and token rotation on top of the user store.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHashing>,
    issuer: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: Arc<dyn CredentialHashing>,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            users,
            hasher,
            issuer,
        }
    }

    pub fn issuer(&self) -> &Arc<TokenIssuer> {
        &self.issuer
    }

    /// Unknown email and wrong password fail identically, in body and in
    /// time: both run one Argon2 computation.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let Some(user) = self.users.find_by_email(email).await? else {
            self.hasher.verify_dummy(password);
            warn!(reason = "unknown_email", "login failed");
            return Err(AuthError::InvalidCredentials.into());
        };

        if !self.hasher.verify(password, &user.password_hash) {
            warn!(user_id = %user.id, reason = "wrong_password", "login failed");
            return Err(AuthError::InvalidCredentials.into());
        }

        let tokens = self.issue(Identity::new(user.id, user.role))?;
        info!(user_id = %user.id, role = %user.role, "user logged in");
        Ok(tokens)
    }

    /// Creates a student account and logs it in.
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<TokenPair> {
        let identity = self
            .create_user(email, password, name, Role::Student)
            .await?;
        self.issue(identity)
    }

    /// Creates an account with an explicit role (used to seed admins).
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        role: Role,
    ) -> Result<Identity> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::InvalidInput("A valid email is required".to_string()));
        }
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("Name is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        let password_hash = self.hasher.hash(password).map_err(|e| {
            error!(error = %e, "password hashing failed");
            AppError::Internal("Failed to create user".to_string())
        })?;

        let user = self
            .users
            .create(NewUser {
                email: email.to_string(),
                name: name.trim().to_string(),
                password_hash,
                role,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(Identity::new(user.id, user.role))
    }

    /// Rotates a refresh token. Claims are copied from the old token; the
    /// user store is not consulted.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        self.issuer.refresh(refresh_token).map_err(|e| match e {
            TokenError::Encoding(detail) => {
                error!(error = %detail, "token encoding failed");
                AppError::Internal("Failed to issue tokens".to_string())
            }
            other => {
                warn!(reason = other.reason_code(), "refresh rejected");
                AuthError::Token(other).into()
            }
        })
    }

    fn issue(&self, identity: Identity) -> Result<TokenPair> {
        self.issuer.issue(identity).map_err(|e| {
            error!(error = %e, user_id = %identity.id, "token issuance failed");
            AppError::Internal("Failed to issue tokens".to_string())
        })
    }
}
