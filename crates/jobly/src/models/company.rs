//! Companies.

use super::contains_pattern;
use crate::changeset::{ValidationCode, ValidationErrors};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::partial_update::{FieldMap, Payload, build_set_clause};
use crate::row::{FromRow, RowExt};
use crate::sql::{Query, Sql, query, sql};
use crate::validate::{is_handle, is_url};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Application field → column for company updates.
pub const COMPANY_COLUMNS: &FieldMap<'static> = &[
    ("numEmployees", "num_employees"),
    ("logoUrl", "logo_url"),
];

const SELECT_COLUMNS: &str = "handle, name, description, num_employees, logo_url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

/// A company with its jobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

/// Body of a company create request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        if !is_handle(&self.handle) {
            errs.add(
                "handle",
                ValidationCode::Regex,
                "must be 1-25 lowercase letters, digits, '-' or '_'",
            );
        }
        if self.name.trim().is_empty() {
            errs.add("name", ValidationCode::Len, "must not be empty");
        }
        if self.num_employees.is_some_and(|n| n < 0) {
            errs.add("numEmployees", ValidationCode::Range, "must be at least 0");
        }
        if self.logo_url.as_deref().is_some_and(|u| !is_url(u)) {
            errs.add("logoUrl", ValidationCode::Url, "must be a valid URL");
        }
        errs
    }
}

/// Optional filters for [`find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the name.
    pub name_like: Option<String>,
    pub min_employees: Option<i32>,
    pub max_employees: Option<i32>,
}

impl CompanyFilter {
    pub fn check(&self) -> JoblyResult<()> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::invalid_input(
                    "minEmployees cannot be greater than maxEmployees",
                ));
            }
        }
        Ok(())
    }

    fn select(&self) -> Sql {
        let mut q = sql(format!("SELECT {SELECT_COLUMNS} FROM companies WHERE 1=1"));
        q.tag("companies.find_all");
        if let Some(name) = self.name_like.as_deref().filter(|s| !s.is_empty()) {
            q.push(" AND name ILIKE ").push_bind(contains_pattern(name));
        }
        if let Some(min) = self.min_employees {
            q.push(" AND num_employees >= ").push_bind(min);
        }
        if let Some(max) = self.max_employees {
            q.push(" AND num_employees <= ").push_bind(max);
        }
        q.push(" ORDER BY name");
        q
    }
}

pub async fn create(conn: &impl GenericClient, new: &NewCompany) -> JoblyResult<Company> {
    let duplicate = query("SELECT handle FROM companies WHERE handle = $1")
        .tag("companies.duplicate_check")
        .bind(new.handle.clone())
        .fetch_opt(conn)
        .await?;
    if duplicate.is_some() {
        return Err(JoblyError::conflict(format!("Duplicate company: {}", new.handle)));
    }

    let company: Company = query(format!(
        "INSERT INTO companies (handle, name, description, num_employees, logo_url) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {SELECT_COLUMNS}"
    ))
    .tag("companies.create")
    .bind(new.handle.clone())
    .bind(new.name.clone())
    .bind(new.description.clone())
    .bind(new.num_employees)
    .bind(new.logo_url.clone())
    .fetch_one_as(conn)
    .await?;

    tracing::info!(target: "jobly", handle = %company.handle, "company created");
    Ok(company)
}

/// Companies matching `filter`, ordered by name.
pub async fn find_all(conn: &impl GenericClient, filter: &CompanyFilter) -> JoblyResult<Vec<Company>> {
    filter.check()?;
    filter.select().fetch_all_as(conn).await
}

pub async fn get(conn: &impl GenericClient, handle: &str) -> JoblyResult<CompanyDetail> {
    let company: Company = query(format!(
        "SELECT {SELECT_COLUMNS} FROM companies WHERE handle = $1"
    ))
    .tag("companies.get")
    .bind(handle.to_string())
    .fetch_opt_as(conn)
    .await?
    .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

    let jobs = query(
        "SELECT id, title, salary, equity FROM jobs WHERE company_handle = $1 ORDER BY id",
    )
    .tag("companies.get_jobs")
    .bind(handle.to_string())
    .fetch_all_as(conn)
    .await?;

    Ok(CompanyDetail { company, jobs })
}

pub(crate) fn update_query(handle: &str, payload: &Payload) -> JoblyResult<Query> {
    let set = build_set_clause(payload, COMPANY_COLUMNS)?;
    let sql = format!(
        "UPDATE companies SET {} WHERE handle = ${} RETURNING {SELECT_COLUMNS}",
        set.clause,
        set.next_placeholder()
    );
    Ok(query(sql)
        .tag("companies.update")
        .bind_all(set.values)
        .bind(handle.to_string()))
}

/// Apply a partial update; `payload` keys are application field names.
///
/// Callers must allow-list the keys first (see [`crate::api::companies`]).
pub async fn update(conn: &impl GenericClient, handle: &str, payload: &Payload) -> JoblyResult<Company> {
    let company = update_query(handle, payload)?
        .fetch_opt_as::<Company>(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No company: {handle}")))?;

    tracing::info!(target: "jobly", handle, fields = payload.len(), "company updated");
    Ok(company)
}

pub async fn remove(conn: &impl GenericClient, handle: &str) -> JoblyResult<()> {
    let deleted = query("DELETE FROM companies WHERE handle = $1 RETURNING handle")
        .tag("companies.remove")
        .bind(handle.to_string())
        .fetch_opt(conn)
        .await?;
    if deleted.is_none() {
        return Err(JoblyError::not_found(format!("No company: {handle}")));
    }
    tracing::info!(target: "jobly", handle, "company removed");
    Ok(())
}
