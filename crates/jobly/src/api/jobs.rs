//! Job requests.

use super::{Deleted, parse_body};
use crate::auth::{Caller, ensure_admin};
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::models::job::{self, Job, JobFilter, NewJob};
use crate::partial_update::Payload;
use crate::validate::{Rule, check_payload};
use serde::Serialize;

/// Fields an update body may carry. `id` and `companyHandle` are fixed.
pub const UPDATE_RULES: &[(&str, Rule)] = &[
    ("title", Rule::NonEmptyText),
    ("salary", Rule::NonNegativeIntOrNull),
    ("equity", Rule::FractionOrNull),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobResponse {
    pub job: Job,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<Job>,
}

pub async fn create(conn: &impl GenericClient, caller: &Caller, body: &str) -> JoblyResult<JobResponse> {
    ensure_admin(caller)?;
    let new: NewJob = parse_body(body)?;
    new.validate().into_result()?;
    let job = job::create(conn, &new).await?;
    Ok(JobResponse { job })
}

pub async fn list(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<JobsResponse> {
    let jobs = job::find_all(conn, filter).await?;
    Ok(JobsResponse { jobs })
}

pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<JobResponse> {
    let job = job::get(conn, id).await?;
    Ok(JobResponse { job })
}

/// Parse and check an update body without touching the database.
pub fn parse_update(body: &str) -> JoblyResult<Payload> {
    let payload: Payload = parse_body(body)?;
    check_payload(&payload, UPDATE_RULES)?;
    Ok(payload)
}

pub async fn update(
    conn: &impl GenericClient,
    caller: &Caller,
    id: i32,
    body: &str,
) -> JoblyResult<JobResponse> {
    ensure_admin(caller)?;
    let payload = parse_update(body)?;
    let job = job::update(conn, id, &payload).await?;
    Ok(JobResponse { job })
}

pub async fn remove(conn: &impl GenericClient, caller: &Caller, id: i32) -> JoblyResult<Deleted<i32>> {
    ensure_admin(caller)?;
    job::remove(conn, id).await?;
    Ok(Deleted { deleted: id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Offline;
    use crate::error::{ErrorKind, JoblyError};

    #[tokio::test]
    async fn writes_require_admin() {
        let user = Caller::user("bob");
        let body = r#"{"title": "Dev", "companyHandle": "acme"}"#;

        assert_eq!(create(&Offline, &user, body).await.unwrap_err().kind(), ErrorKind::Unauthorized);
        assert_eq!(
            update(&Offline, &user, 1, r#"{"salary": 1}"#).await.unwrap_err().kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(remove(&Offline, &user, 1).await.unwrap_err().kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn create_validates_before_insert() {
        let err = create(
            &Offline,
            &Caller::admin("root"),
            r#"{"title": "Dev", "salary": -10, "companyHandle": "acme"}"#,
        )
        .await
        .unwrap_err();
        let JoblyError::Validation(errs) = err else {
            panic!("expected validation error");
        };
        assert!(errs.has_field("salary"));
    }

    #[test]
    fn parse_update_rejects_company_handle() {
        let err = parse_update(r#"{"salary": 100, "companyHandle": "other"}"#).unwrap_err();
        let JoblyError::Validation(errs) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errs.len(), 1);
        assert!(errs.has_field("companyHandle"));
    }

    #[test]
    fn parse_update_checks_equity_range() {
        assert!(parse_update(r#"{"equity": 0.25}"#).is_ok());
        assert!(parse_update(r#"{"equity": null}"#).is_ok());
        assert!(matches!(
            parse_update(r#"{"equity": 2}"#),
            Err(JoblyError::Validation(_))
        ));
    }

    #[test]
    fn empty_body_passes_checks_but_has_no_fields() {
        // The clause builder rejects it once the update runs.
        let payload = parse_update("{}").unwrap();
        assert!(payload.is_empty());
    }
}
