//! Embedded schema migrations via [`refinery`].
//!
//! The SQL files under `migrations/` are compiled into the crate, so a binary
//! can bring an empty database up to date without shipping files.
//!
//! # Example
//!
//! ```ignore
//! let pool = jobly::create_pool(&config.database.url)?;
//! let report = jobly::migrate::run_pool(&pool).await?;
//! ```

use crate::error::JoblyResult;

pub use refinery::Report;

mod embedded {
    refinery::embed_migrations!("migrations");
}

/// Run all pending migrations on a single PostgreSQL connection.
pub async fn run(client: &mut tokio_postgres::Client) -> JoblyResult<Report> {
    let report = embedded::migrations::runner().run_async(client).await?;
    for m in report.applied_migrations() {
        tracing::info!(target: "jobly", version = m.version(), name = m.name(), "applied migration");
    }
    Ok(report)
}

/// Run all pending migrations using a connection from `pool`.
#[cfg(feature = "pool")]
pub async fn run_pool(pool: &deadpool_postgres::Pool) -> JoblyResult<Report> {
    let mut client = pool.get().await?;
    run(&mut client).await
}
