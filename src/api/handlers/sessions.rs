use super::QueryParams;
use crate::{
    AppState,
    auth::middleware::AuthUser,
    policy::SessionFilters,
    types::{AppError, ErrorEnvelope, Result, SessionsResponse},
};
use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

/// Raw query string; every field is parsed by hand so bad input gets the
/// standard `BAD_REQUEST` envelope.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SessionListParams {
    /// Only sessions of this program (UUID)
    pub program_id: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD`
    pub start_date: Option<String>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (whole day included)
    pub end_date: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// List a user's practice sessions
#[utoipa::path(
    get,
    path = "/users/{user_id}/sessions",
    params(
        ("user_id" = String, Path, description = "User whose sessions are requested"),
        SessionListParams
    ),
    responses(
        (status = 200, description = "Sessions page", body = SessionsResponse),
        (status = 400, description = "Malformed identifier, date or pagination", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid access token", body = ErrorEnvelope),
        (status = 403, description = "Requester may not view these sessions", body = ErrorEnvelope),
        (status = 500, description = "Failed to fetch user sessions", body = ErrorEnvelope)
    ),
    security(("bearer" = [])),
    tag = "sessions"
)]
pub async fn list_user_sessions(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<String>,
    QueryParams(params): QueryParams<SessionListParams>,
) -> Result<Json<SessionsResponse>> {
    let target = parse_uuid(&user_id, "user ID")?;
    let filters = parse_filters(&params)?;

    let page = state
        .session_service
        .get_user_sessions(&identity, target, filters)
        .await?;

    Ok(Json(page))
}

fn parse_filters(params: &SessionListParams) -> Result<SessionFilters> {
    let program_id = params
        .program_id
        .as_deref()
        .map(|raw| parse_uuid(raw, "program ID"))
        .transpose()?;
    let start = params
        .start_date
        .as_deref()
        .map(|raw| parse_date(raw, Bound::Start))
        .transpose()?;
    let end = params
        .end_date
        .as_deref()
        .map(|raw| parse_date(raw, Bound::End))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end)
        && start > end
    {
        return Err(AppError::InvalidInput(
            "start_date must not be after end_date".to_string(),
        ));
    }

    Ok(SessionFilters {
        program_id,
        start,
        end,
        limit: parse_int(params.limit.as_deref(), "limit")?,
        offset: parse_int(params.offset.as_deref(), "offset")?,
    })
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidInput(format!("Invalid {what}")))
}

fn parse_date(raw: &str, bound: Bound) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        AppError::InvalidInput(format!(
            "Invalid date format '{raw}', expected YYYY-MM-DD or RFC 3339"
        ))
    })?;
    let time = match bound {
        Bound::Start => date.and_hms_opt(0, 0, 0),
        Bound::End => date.and_hms_opt(23, 59, 59),
    };
    time.map(|t| t.and_utc())
        .ok_or_else(|| AppError::InvalidInput(format!("Invalid date '{raw}'")))
}

fn parse_int(raw: Option<&str>, name: &str) -> Result<Option<i64>> {
    raw.map(|v| {
        v.trim()
            .parse::<i64>()
            .map_err(|_| AppError::InvalidInput(format!("{name} must be an integer")))
    })
    .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("2026-03-01", Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap())]
    #[case("2026-03-01T10:30:00Z", Utc.with_ymd_and_hms(2026, 3, 1, 10, 30, 0).unwrap())]
    #[case("2026-03-01T10:30:00+02:00", Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap())]
    fn test_parse_start_date(#[case] raw: &str, #[case] expected: DateTime<Utc>) {
        assert_eq!(parse_date(raw, Bound::Start).unwrap(), expected);
    }

    #[test]
    fn test_date_only_end_covers_whole_day() {
        assert_eq!(
            parse_date("2026-03-01", Bound::End).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 59).unwrap()
        );
    }

    #[rstest]
    #[case("yesterday")]
    #[case("2026-13-01")]
    #[case("01/03/2026")]
    #[case("")]
    fn test_parse_date_rejects_garbage(#[case] raw: &str) {
        assert!(matches!(
            parse_date(raw, Bound::Start),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_filters_defaults() {
        let filters = parse_filters(&SessionListParams::default()).unwrap();
        assert_eq!(filters, SessionFilters::default());
    }

    #[test]
    fn test_parse_filters_full() {
        let program = Uuid::new_v4();
        let params = SessionListParams {
            program_id: Some(program.to_string()),
            start_date: Some("2026-01-01".to_string()),
            end_date: Some("2026-01-31".to_string()),
            limit: Some("50".to_string()),
            offset: Some("10".to_string()),
        };

        let filters = parse_filters(&params).unwrap();
        assert_eq!(filters.program_id, Some(program));
        assert_eq!(filters.limit, Some(50));
        assert_eq!(filters.offset, Some(10));
        assert!(filters.start < filters.end);
    }

    #[rstest]
    #[case(SessionListParams { program_id: Some("abc".into()), ..Default::default() })]
    #[case(SessionListParams { limit: Some("ten".into()), ..Default::default() })]
    #[case(SessionListParams { offset: Some("1.5".into()), ..Default::default() })]
    #[case(SessionListParams {
        start_date: Some("2026-02-01".into()),
        end_date: Some("2026-01-01".into()),
        ..Default::default()
    })]
    fn test_parse_filters_rejects(#[case] params: SessionListParams) {
        assert!(matches!(
            parse_filters(&params),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parse_uuid() {
        assert!(parse_uuid("not-a-uuid", "user ID").is_err());
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string(), "user ID").unwrap(), id);
    }
}
