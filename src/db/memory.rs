//! In-memory stores used by the dev server and tests.

use super::traits::{NewUser, SessionQuery, SessionRepository, UserRecord, UserRepository};
use crate::types::{AppError, PracticeSession, Result};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl UserRepository for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.read().get(&normalize_email(email)).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord> {
        let key = normalize_email(&user.email);
        let mut users = self.users.write();

        if users.contains_key(&key) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let record = UserRecord {
            id: Uuid::new_v4(),
            email: key.clone(),
            name: user.name,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        users.insert(key, record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<UserRecord>> {
        let mut users: Vec<UserRecord> = self.users.read().values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<Vec<PracticeSession>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: PracticeSession) {
        self.sessions.write().push(session);
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionStore {
    /// Newest first, then offset/limit.
    async fn list_user_sessions(&self, query: &SessionQuery) -> Result<Vec<PracticeSession>> {
        let mut matching: Vec<PracticeSession> = self
            .sessions
            .read()
            .iter()
            .filter(|s| s.user_id == query.user_id)
            .filter(|s| query.program_id.is_none_or(|p| s.program_id == p))
            .filter(|s| query.start.is_none_or(|start| s.started_at >= start))
            .filter(|s| query.end.is_none_or(|end| s.started_at <= end))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.started_at.cmp(&a.started_at));

        Ok(matching
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;
    use chrono::{Duration, TimeZone};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            name: "Test User".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role: Role::Student,
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = InMemoryUserStore::new();
        let created = store.create(new_user("Ana@Example.com")).await.unwrap();

        let found = store.find_by_email("ana@example.com").await.unwrap();
        assert_eq!(found.map(|u| u.id), Some(created.id));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = InMemoryUserStore::new();
        store.create(new_user("dup@example.com")).await.unwrap();

        let result = store.create(new_user("DUP@example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_session_filters_and_pagination() {
        let store = InMemorySessionStore::new();
        let user = Uuid::new_v4();
        let program = Uuid::new_v4();
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();

        for day in 0..5 {
            store.insert(PracticeSession {
                id: Uuid::new_v4(),
                user_id: user,
                program_id: if day % 2 == 0 { program } else { Uuid::new_v4() },
                started_at: base + Duration::days(day),
                duration_secs: 600,
            });
        }
        store.insert(PracticeSession {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            program_id: program,
            started_at: base,
            duration_secs: 60,
        });

        let all = SessionQuery {
            user_id: user,
            program_id: None,
            start: None,
            end: None,
            limit: 20,
            offset: 0,
        };
        let sessions = store.list_user_sessions(&all).await.unwrap();
        assert_eq!(sessions.len(), 5);
        assert!(sessions[0].started_at > sessions[4].started_at);

        let by_program = SessionQuery {
            program_id: Some(program),
            ..all.clone()
        };
        assert_eq!(store.list_user_sessions(&by_program).await.unwrap().len(), 3);

        let ranged = SessionQuery {
            start: Some(base + Duration::days(1)),
            end: Some(base + Duration::days(3)),
            ..all.clone()
        };
        assert_eq!(store.list_user_sessions(&ranged).await.unwrap().len(), 3);

        let paged = SessionQuery {
            limit: 2,
            offset: 4,
            ..all
        };
        assert_eq!(store.list_user_sessions(&paged).await.unwrap().len(), 1);
    }
}
