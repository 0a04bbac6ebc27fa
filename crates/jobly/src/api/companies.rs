//! Company requests.

use super::{Deleted, parse_body};
use crate::auth::{Caller, ensure_admin};
use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::models::company::{self, Company, CompanyDetail, CompanyFilter, NewCompany};
use crate::partial_update::Payload;
use crate::validate::{Rule, check_payload};
use serde::Serialize;

/// Fields an update body may carry, with the check each value must pass.
pub const UPDATE_RULES: &[(&str, Rule)] = &[
    ("name", Rule::NonEmptyText),
    ("description", Rule::Text),
    ("numEmployees", Rule::NonNegativeIntOrNull),
    ("logoUrl", Rule::UrlOrNull),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyResponse {
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetailResponse {
    pub company: CompanyDetail,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

pub async fn create(
    conn: &impl GenericClient,
    caller: &Caller,
    body: &str,
) -> JoblyResult<CompanyResponse> {
    ensure_admin(caller)?;
    let new: NewCompany = parse_body(body)?;
    new.validate().into_result()?;
    let company = company::create(conn, &new).await?;
    Ok(CompanyResponse { company })
}

pub async fn list(conn: &impl GenericClient, filter: &CompanyFilter) -> JoblyResult<CompaniesResponse> {
    let companies = company::find_all(conn, filter).await?;
    Ok(CompaniesResponse { companies })
}

pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetailResponse> {
    let company = company::get(conn, handle).await?;
    Ok(CompanyDetailResponse { company })
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
    handle: &str,
    body: &str,
) -> JoblyResult<CompanyResponse> {
    ensure_admin(caller)?;
    let payload = parse_update(body)?;
    let company = company::update(conn, handle, &payload).await?;
    Ok(CompanyResponse { company })
}

pub async fn remove(
    conn: &impl GenericClient,
    caller: &Caller,
    handle: &str,
) -> JoblyResult<Deleted<String>> {
    ensure_admin(caller)?;
    company::remove(conn, handle).await?;
    Ok(Deleted {
        deleted: handle.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Offline;
    use crate::error::{ErrorKind, JoblyError};

    #[tokio::test]
    async fn writes_require_admin() {
        let body = r#"{"handle": "acme", "name": "Acme", "description": ""}"#;
        let user = Caller::user("bob");

        let err = create(&Offline, &user, body).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err = update(&Offline, &user, "acme", r#"{"name": "X"}"#).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        let err = remove(&Offline, &Caller::anonymous(), "acme").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn invalid_bodies_fail_before_the_database() {
        let admin = Caller::admin("root");

        let err = create(&Offline, &admin, r#"{"handle": "Bad!", "name": "x", "description": ""}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, JoblyError::Validation(_)));

        let err = update(&Offline, &admin, "acme", "{}").await.unwrap_err();
        assert!(matches!(err, JoblyError::InvalidInput(_)));

        let err = list(
            &Offline,
            &CompanyFilter {
                min_employees: Some(9),
                max_employees: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, JoblyError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn valid_admin_write_reaches_the_client() {
        let err = update(&Offline, &Caller::admin("root"), "acme", r#"{"name": "X"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, JoblyError::Connection(_)));
    }

    #[test]
    fn parse_update_accepts_allowed_fields_in_order() {
        let payload = parse_update(r#"{"logoUrl": null, "numEmployees": 12, "name": "Acme"}"#).unwrap();
        assert_eq!(
            payload.keys().collect::<Vec<_>>(),
            vec!["logoUrl", "numEmployees", "name"]
        );
    }

    #[test]
    fn parse_update_rejects_handle_changes() {
        let err = parse_update(r#"{"handle": "new-handle"}"#).unwrap_err();
        match err {
            JoblyError::Validation(errs) => {
                assert!(errs.has_field("handle"));
                assert_eq!(errs.items[0].code.as_str(), "unknown_field");
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn parse_update_reports_every_bad_field() {
        let err = parse_update(r#"{"name": "", "numEmployees": -3, "logoUrl": 5}"#).unwrap_err();
        let JoblyError::Validation(errs) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errs.len(), 3);
        assert_eq!(JoblyError::Validation(errs).kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn parse_update_rejects_nested_values() {
        let err = parse_update(r#"{"name": {"first": "x"}}"#).unwrap_err();
        assert!(matches!(err, JoblyError::InvalidInput(_)));
    }
}
