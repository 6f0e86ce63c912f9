//! Resource-level access decisions.
//!
//! Route-level role gating lives in [`crate::auth::middleware::require_role`];
//! this module answers "may this identity touch *that* user's data?". The
//! decision functions are pure and run before any repository call.
//!
//! Roles come from the verified token, not from storage, so a role change is
//! only seen once the user obtains a token through a fresh login.

mod sessions;

pub use sessions::{SessionFilters, SessionService};

use crate::types::{AppError, Identity, Role};
use serde::Serialize;
use uuid::Uuid;

pub const VIEW_SESSIONS_DENIED: &str = "You don't have permission to view these sessions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// Admins may act on any user.
    AdminOverride,
    /// The requester is the resource owner.
    Owner,
    Forbidden,
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: ReasonCode,
}

impl AccessDecision {
    pub fn allow(reason: ReasonCode) -> Self {
        Self {
            allowed: true,
            reason,
        }
    }

    pub fn deny() -> Self {
        Self {
            allowed: false,
            reason: ReasonCode::Forbidden,
        }
    }

    /// `Ok(())` on allow, `AppError::Forbidden(message)` on deny.
    pub fn enforce(self, message: &str) -> Result<(), AppError> {
        if self.allowed {
            Ok(())
        } else {
            Err(AppError::Forbidden(message.to_string()))
        }
    }
}

/// May `requester` view the practice sessions of user `target`?
pub fn can_view_user_sessions(requester: &Identity, target: Uuid) -> AccessDecision {
    match requester.role {
        Role::Admin => AccessDecision::allow(ReasonCode::AdminOverride),
        Role::Student if requester.id == target => AccessDecision::allow(ReasonCode::Owner),
        Role::Student => AccessDecision::deny(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const A: Uuid = Uuid::from_u128(0xA);
    const B: Uuid = Uuid::from_u128(0xB);

    #[rstest]
    #[case(Role::Admin, A, A, true, ReasonCode::AdminOverride)]
    #[case(Role::Admin, A, B, true, ReasonCode::AdminOverride)]
    #[case(Role::Student, A, A, true, ReasonCode::Owner)]
    #[case(Role::Student, A, B, false, ReasonCode::Forbidden)]
    #[case(Role::Student, B, A, false, ReasonCode::Forbidden)]
    fn test_view_sessions_decision_table(
        #[case] role: Role,
        #[case] requester: Uuid,
        #[case] target: Uuid,
        #[case] allowed: bool,
        #[case] reason: ReasonCode,
    ) {
        let decision = can_view_user_sessions(&Identity::new(requester, role), target);

        assert_eq!(decision.allowed, allowed);
        assert_eq!(decision.reason, reason);
    }

    #[test]
    fn test_ownership_rule_exhaustive() {
        let ids: Vec<Uuid> = (0..6).map(Uuid::from_u128).collect();

        for role in [Role::Admin, Role::Student] {
            for requester in &ids {
                for target in &ids {
                    let decision = can_view_user_sessions(&Identity::new(*requester, role), *target);
                    let expected = role == Role::Admin || requester == target;
                    assert_eq!(decision.allowed, expected, "{role} {requester} -> {target}");
                    if !expected {
                        assert_eq!(decision.reason, ReasonCode::Forbidden);
                    }
                }
            }
        }
    }

    #[test]
    fn test_enforce_maps_deny_to_forbidden() {
        let err = AccessDecision::deny()
            .enforce(VIEW_SESSIONS_DENIED)
            .unwrap_err();

        match err {
            AppError::Forbidden(message) => assert_eq!(message, VIEW_SESSIONS_DENIED),
            other => panic!("expected Forbidden, got {other:?}"),
        }
        assert!(AccessDecision::allow(ReasonCode::Owner).enforce("x").is_ok());
    }

    #[test]
    fn test_reason_code_serialization() {
        assert_eq!(
            serde_json::to_string(&ReasonCode::AdminOverride).unwrap(),
            r#""ADMIN_OVERRIDE""#
        );
        assert_eq!(
            serde_json::to_string(&ReasonCode::Forbidden).unwrap(),
            r#""FORBIDDEN""#
        );
    }
}
