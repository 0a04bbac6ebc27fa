//! Jobs.

use super::contains_pattern;
use crate::changeset::{ValidationCode, ValidationErrors};
use crate::client::GenericClient;
use crate::error::{JoblyError, JoblyResult};
use crate::partial_update::{FieldMap, Payload, build_set_clause};
use crate::row::{FromRow, RowExt};
use crate::sql::{Query, Sql, query, sql};
use crate::validate::is_handle;
use crate::value::SqlValue;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Application field → column for job updates.
///
/// Every updatable job field already matches its column name.
pub const JOB_COLUMNS: &FieldMap<'static> = &[
    ("title", "title"),
    ("salary", "salary"),
    ("equity", "equity"),
];

const SELECT_COLUMNS: &str = "id, title, salary, equity, company_handle";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    /// `NUMERIC`, serialized as a decimal string.
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> JoblyResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

/// Body of a job create request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<f64>,
    pub company_handle: String,
}

impl NewJob {
    pub fn validate(&self) -> ValidationErrors {
        let mut errs = ValidationErrors::new();
        if self.title.trim().is_empty() {
            errs.add("title", ValidationCode::Len, "must not be empty");
        }
        if self.salary.is_some_and(|s| s < 0) {
            errs.add("salary", ValidationCode::Range, "must be at least 0");
        }
        if self.equity.is_some_and(|e| !(0.0..=1.0).contains(&e)) {
            errs.add("equity", ValidationCode::Range, "must be between 0 and 1");
        }
        if !is_handle(&self.company_handle) {
            errs.add(
                "companyHandle",
                ValidationCode::Regex,
                "must be 1-25 lowercase letters, digits, '-' or '_'",
            );
        }
        errs
    }
}

/// Optional filters for [`find_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps jobs with non-zero equity; otherwise no filter.
    pub has_equity: Option<bool>,
}

impl JobFilter {
    fn select(&self) -> Sql {
        let mut q = sql(format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE 1=1"));
        q.tag("jobs.find_all");
        if let Some(title) = self.title.as_deref().filter(|s| !s.is_empty()) {
            q.push(" AND title ILIKE ").push_bind(contains_pattern(title));
        }
        if let Some(min) = self.min_salary {
            q.push(" AND salary >= ").push_bind(min);
        }
        if self.has_equity == Some(true) {
            q.push(" AND equity > 0");
        }
        q.push(" ORDER BY title, id");
        q
    }
}

pub async fn create(conn: &impl GenericClient, new: &NewJob) -> JoblyResult<Job> {
    let job: Job = query(format!(
        "INSERT INTO jobs (title, salary, equity, company_handle) \
         VALUES ($1, $2, $3, $4) RETURNING {SELECT_COLUMNS}"
    ))
    .tag("jobs.create")
    .bind(new.title.clone())
    .bind(new.salary)
    .bind(SqlValue::from(new.equity))
    .bind(new.company_handle.clone())
    .fetch_one_as(conn)
    .await?;

    tracing::info!(target: "jobly", id = job.id, company = %job.company_handle, "job created");
    Ok(job)
}

/// Jobs matching `filter`, ordered by title.
pub async fn find_all(conn: &impl GenericClient, filter: &JobFilter) -> JoblyResult<Vec<Job>> {
    filter.select().fetch_all_as(conn).await
}

pub async fn get(conn: &impl GenericClient, id: i32) -> JoblyResult<Job> {
    query(format!("SELECT {SELECT_COLUMNS} FROM jobs WHERE id = $1"))
        .tag("jobs.get")
        .bind(id)
        .fetch_opt_as(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))
}

pub(crate) fn update_query(id: i32, payload: &Payload) -> JoblyResult<Query> {
    let set = build_set_clause(payload, JOB_COLUMNS)?;
    let sql = format!(
        "UPDATE jobs SET {} WHERE id = ${} RETURNING {SELECT_COLUMNS}",
        set.clause,
        set.next_placeholder()
    );
    Ok(query(sql).tag("jobs.update").bind_all(set.values).bind(id))
}

/// Apply a partial update to job `id`.
pub async fn update(conn: &impl GenericClient, id: i32, payload: &Payload) -> JoblyResult<Job> {
    let job = update_query(id, payload)?
        .fetch_opt_as::<Job>(conn)
        .await?
        .ok_or_else(|| JoblyError::not_found(format!("No job: {id}")))?;

    tracing::info!(target: "jobly", id, fields = payload.len(), "job updated");
    Ok(job)
}

pub async fn remove(conn: &impl GenericClient, id: i32) -> JoblyResult<()> {
    let affected = query("DELETE FROM jobs WHERE id = $1")
        .tag("jobs.remove")
        .bind(id)
        .execute(conn)
        .await?;
    if affected == 0 {
        return Err(JoblyError::not_found(format!("No job: {id}")));
    }
    tracing::info!(target: "jobly", id, "job removed");
    Ok(())
}
