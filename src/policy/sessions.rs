use super::{VIEW_SESSIONS_DENIED, can_view_user_sessions};
use crate::db::{SessionQuery, SessionRepository};
use crate::types::{AppError, Identity, Result, SessionsResponse};
use crate::utils::config::PaginationConfig;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Optional, already-parsed filters for a session listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionFilters {
    pub program_id: Option<Uuid>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Access-checked reads of practice sessions.
pub struct SessionService {
    repository: Arc<dyn SessionRepository>,
    pagination: PaginationConfig,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository>, pagination: PaginationConfig) -> Self {
        Self {
            repository,
            pagination,
        }
    }

    /// Lists `target`'s sessions if `requester` is allowed to see them.
    ///
    /// Denials and invalid pagination return before the repository is called.
    pub async fn get_user_sessions(
        &self,
        requester: &Identity,
        target: Uuid,
        filters: SessionFilters,
    ) -> Result<SessionsResponse> {
        let (limit, offset) = self.page_bounds(filters.limit, filters.offset)?;

        let decision = can_view_user_sessions(requester, target);
        if !decision.allowed {
            warn!(
                requester = %requester.id,
                role = %requester.role,
                target = %target,
                "session access denied"
            );
        }
        decision.enforce(VIEW_SESSIONS_DENIED)?;

        let query = SessionQuery {
            user_id: target,
            program_id: filters.program_id,
            start: filters.start,
            end: filters.end,
            limit,
            offset,
        };
        debug!(requester = %requester.id, reason = ?decision.reason, ?query, "listing sessions");

        let sessions = self.repository.list_user_sessions(&query).await.map_err(|e| {
            error!(error = %e, user_id = %target, "failed to fetch user sessions");
            AppError::Internal("Failed to fetch user sessions".to_string())
        })?;

        Ok(SessionsResponse {
            sessions,
            limit,
            offset,
        })
    }

    /// Applies defaults, clamps `limit` to the configured maximum and rejects
    /// non-positive limits or negative offsets.
    fn page_bounds(&self, limit: Option<i64>, offset: Option<i64>) -> Result<(i64, i64)> {
        let limit = match limit {
            None => self.pagination.default_limit,
            Some(l) if l <= 0 => {
                return Err(AppError::InvalidInput(
                    "limit must be a positive integer".to_string(),
                ));
            }
            Some(l) => l.min(self.pagination.max_limit),
        };

        let offset = offset.unwrap_or(0);
        if offset < 0 {
            return Err(AppError::InvalidInput(
                "offset must not be negative".to_string(),
            ));
        }

        Ok((limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::traits::MockSessionRepository;
    use crate::types::{PracticeSession, Role};
    use mockall::predicate::eq;

    fn service(repo: MockSessionRepository) -> SessionService {
        SessionService::new(Arc::new(repo), PaginationConfig::default())
    }

    fn session_for(user_id: Uuid) -> PracticeSession {
        PracticeSession {
            id: Uuid::new_v4(),
            user_id,
            program_id: Uuid::new_v4(),
            started_at: Utc::now(),
            duration_secs: 900,
        }
    }

    #[tokio::test]
    async fn test_admin_views_student_sessions_with_program_filter() {
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);
        let student = Uuid::new_v4();
        let program = Uuid::new_v4();
        let returned = vec![session_for(student)];

        let mut repo = MockSessionRepository::new();
        let expected = returned.clone();
        repo.expect_list_user_sessions()
            .with(eq(SessionQuery {
                user_id: student,
                program_id: Some(program),
                start: None,
                end: None,
                limit: 20,
                offset: 0,
            }))
            .times(1)
            .returning(move |_| Ok(expected.clone()));

        let filters = SessionFilters {
            program_id: Some(program),
            ..SessionFilters::default()
        };
        let page = service(repo)
            .get_user_sessions(&admin, student, filters)
            .await
            .expect("admin should be allowed");

        assert_eq!(page.sessions, returned);
        assert_eq!((page.limit, page.offset), (20, 0));
    }

    #[tokio::test]
    async fn test_student_denied_other_students_sessions() {
        let student_a = Identity::new(Uuid::new_v4(), Role::Student);
        let student_b = Uuid::new_v4();

        let mut repo = MockSessionRepository::new();
        repo.expect_list_user_sessions().times(0);

        let result = service(repo)
            .get_user_sessions(&student_a, student_b, SessionFilters::default())
            .await;

        match result {
            Err(AppError::Forbidden(message)) => {
                assert_eq!(message, "You don't have permission to view these sessions");
            }
            other => panic!("expected Forbidden, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_student_views_own_sessions() {
        let student = Identity::new(Uuid::new_v4(), Role::Student);

        let mut repo = MockSessionRepository::new();
        repo.expect_list_user_sessions()
            .with(eq(SessionQuery {
                user_id: student.id,
                program_id: None,
                start: None,
                end: None,
                limit: 20,
                offset: 0,
            }))
            .times(1)
            .returning(|_| Ok(vec![]));

        let page = service(repo)
            .get_user_sessions(&student, student.id, SessionFilters::default())
            .await
            .expect("owner should be allowed");

        assert!(page.sessions.is_empty());
    }

    #[tokio::test]
    async fn test_filters_forwarded_verbatim() {
        let student = Identity::new(Uuid::new_v4(), Role::Student);
        let filters = SessionFilters {
            program_id: Some(Uuid::new_v4()),
            start: Some(Utc::now() - chrono::Duration::days(7)),
            end: Some(Utc::now()),
            limit: Some(5),
            offset: Some(10),
        };
        let expected = SessionQuery {
            user_id: student.id,
            program_id: filters.program_id,
            start: filters.start,
            end: filters.end,
            limit: 5,
            offset: 10,
        };

        let mut repo = MockSessionRepository::new();
        repo.expect_list_user_sessions()
            .with(eq(expected))
            .times(1)
            .returning(|_| Ok(vec![]));

        service(repo)
            .get_user_sessions(&student, student.id, filters)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_limit_is_clamped_to_max() {
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);

        let mut repo = MockSessionRepository::new();
        repo.expect_list_user_sessions()
            .withf(|q| q.limit == 100)
            .times(1)
            .returning(|_| Ok(vec![]));

        let filters = SessionFilters {
            limit: Some(5_000),
            ..SessionFilters::default()
        };
        let page = service(repo)
            .get_user_sessions(&admin, Uuid::new_v4(), filters)
            .await
            .unwrap();

        assert_eq!(page.limit, 100);
    }

    #[tokio::test]
    async fn test_invalid_pagination_rejected_before_repository() {
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);

        for (limit, offset) in [(Some(0), None), (Some(-3), None), (None, Some(-1))] {
            let mut repo = MockSessionRepository::new();
            repo.expect_list_user_sessions().times(0);

            let filters = SessionFilters {
                limit,
                offset,
                ..SessionFilters::default()
            };
            let result = service(repo)
                .get_user_sessions(&admin, Uuid::new_v4(), filters)
                .await;

            assert!(
                matches!(result, Err(AppError::InvalidInput(_))),
                "limit={limit:?} offset={offset:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_repository_failure_is_wrapped() {
        let admin = Identity::new(Uuid::new_v4(), Role::Admin);

        let mut repo = MockSessionRepository::new();
        repo.expect_list_user_sessions()
            .times(1)
            .returning(|_| Err(AppError::Database("connection refused on 10.0.0.5".to_string())));

        let result = service(repo)
            .get_user_sessions(&admin, Uuid::new_v4(), SessionFilters::default())
            .await;

        match result {
            Err(AppError::Internal(message)) => {
                assert_eq!(message, "Failed to fetch user sessions");
            }
            other => panic!("expected Internal, got {other:?}"),
        }
    }
}
