//! SQL execution helpers.
//!
//! - [`query()`] takes a complete SQL string with `$1, $2, ...` already in it.
//! - [`sql()`] composes SQL dynamically and numbers placeholders itself.
//!
//! # Example
//!
//! ```ignore
//! use jobly::sql;
//!
//! let mut q = sql("SELECT handle, name FROM companies WHERE 1=1");
//! if let Some(min) = min_employees {
//!     q.push(" AND num_employees >= ").push_bind(min);
//! }
//! q.push(" ORDER BY name");
//!
//! let companies: Vec<Company> = q.fetch_all_as(&conn).await?;
//! ```

mod builder;
mod query;


pub use builder::Sql;
pub use query::Query;

/// Build a SQL query from a pre-numbered SQL string (`$1, $2, ...`).
pub fn query(initial_sql: impl Into<String>) -> Query {
    Query::new(initial_sql)
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

const MAX_LOGGED_SQL: usize = 200;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emit the statement about to run on the `jobly.sql` target.
pub(crate) fn trace_statement(tag: Option<&str>, sql: &str, param_count: usize) {
    let tag = tag.unwrap_or("-");
    if sql.len() > MAX_LOGGED_SQL {
        let sql = truncate_sql_bytes(sql, MAX_LOGGED_SQL);
        tracing::debug!(target: "jobly.sql", tag, param_count, sql = %format_args!("{sql}..."));
    } else {
        tracing::debug!(target: "jobly.sql", tag, param_count, sql = %sql);
    }
}
