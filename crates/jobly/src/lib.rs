//! # jobly
//!
//! Companies and jobs over PostgreSQL.
//!
//! ## Features
//!
//! - **Partial updates**: [`build_set_clause`] turns an ordered [`Payload`] into a
//!   `"col"=$1, "col2"=$2` assignment list plus the values to bind
//! - **SQL explicit**: statements are plain SQL via [`query()`] / [`sql()`], all values bound
//! - **Transaction-friendly**: every data-access function takes `&impl GenericClient`
//! - **Admin-gated writes**: request operations in [`api`] check the [`Caller`] first
//! - **Embedded migrations**: `migrate::run` applies the bundled schema (feature `migrate`)
//!
//! ## Partial updates
//!
//! ```ignore
//! use jobly::{Payload, build_set_clause};
//!
//! let payload: Payload = serde_json::from_str(r#"{"numEmployees": 250, "name": "Acme"}"#)?;
//! let set = build_set_clause(&payload, jobly::models::company::COMPANY_COLUMNS)?;
//!
//! assert_eq!(set.clause, r#""num_employees"=$1, "name"=$2"#);
//! let sql = format!(
//!     "UPDATE companies SET {} WHERE handle = ${} RETURNING *",
//!     set.clause,
//!     set.next_placeholder(),
//! );
//! ```

pub mod api;
pub mod auth;
pub mod changeset;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod partial_update;
pub mod row;
pub mod sql;
pub mod validate;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "migrate")]
pub mod migrate;

pub use auth::{Caller, ensure_admin};
pub use changeset::{ValidationCode, ValidationError, ValidationErrors};
pub use client::GenericClient;
pub use config::{DatabaseConfig, JoblyConfig};
pub use error::{ErrorKind, JoblyError, JoblyResult};
pub use models::{Company, CompanyDetail, CompanyFilter, Job, JobFilter, NewCompany, NewJob};
pub use partial_update::{FieldMap, Payload, SetClause, build_set_clause};
pub use row::{FromRow, RowExt};
pub use sql::{Query, Sql, query, sql};
pub use value::SqlValue;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_from_config, create_pool_with_size};
