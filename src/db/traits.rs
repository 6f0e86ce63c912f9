//! Storage collaborator traits
//!
//! The auth core never talks to a database directly. It reaches users and
//! practice sessions through these traits so that the SQL layer (or the
//! in-memory stores in [`super::memory`]) can be swapped freely.

use crate::types::{PracticeSession, Result, Role, UserSummary};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A persisted user, including the stored password hash.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    /// Fails with `AppError::Conflict` when the email is already taken.
    async fn create(&self, user: NewUser) -> Result<UserRecord>;

    async fn list(&self) -> Result<Vec<UserRecord>>;
}

/// Filters for listing one user's practice sessions, forwarded verbatim from
/// the access-checked request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionQuery {
    pub user_id: Uuid,
    pub program_id: Option<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: i64,
    pub offset: i64,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn list_user_sessions(&self, query: &SessionQuery) -> Result<Vec<PracticeSession>>;
}
