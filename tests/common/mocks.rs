//! Repository doubles for end-to-end tests.
//!
//! These wrap the in-memory stores and record how often the data layer was
//! reached, so tests can prove that denied requests never touch it.

use async_trait::async_trait;
use practica::db::{InMemorySessionStore, SessionQuery, SessionRepository};
use practica::types::{AppError, PracticeSession, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Session repository that counts `list_user_sessions` calls.
///
/// # Examples
///
/// ```ignore
/// let repo = CountingSessionRepository::new();
/// repo.insert(session);
/// // ... drive requests ...
/// assert_eq!(repo.calls(), 0);
/// ```
#[derive(Default)]
pub struct CountingSessionRepository {
    inner: InMemorySessionStore,
    calls: AtomicUsize,
    last_query: parking_lot::Mutex<Option<SessionQuery>>,
    should_fail: bool,
}

impl CountingSessionRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A repository whose every read fails with a database error.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            should_fail: true,
            ..Self::default()
        })
    }

    pub fn insert(&self, session: PracticeSession) {
        self.inner.insert(session);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_query(&self) -> Option<SessionQuery> {
        self.last_query.lock().clone()
    }
}

#[async_trait]
impl SessionRepository for CountingSessionRepository {
    async fn list_user_sessions(&self, query: &SessionQuery) -> Result<Vec<PracticeSession>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock() = Some(query.clone());

        if self.should_fail {
            return Err(AppError::Database(
                "connection to 10.0.0.7:5432 refused".to_string(),
            ));
        }
        self.inner.list_user_sessions(query).await
    }
}
