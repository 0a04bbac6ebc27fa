use crate::cli::ConnArgs;
use crate::render;
use anyhow::Context;
use jobly::api::{companies, jobs};
use jobly::pool::DEFAULT_POOL_SIZE;
use jobly::{Caller, CompanyFilter, DatabaseConfig, JobFilter, JoblyConfig};

/// Config file if present, else the environment; `--database` wins over both.
fn resolve_config(conn: &ConnArgs) -> anyhow::Result<JoblyConfig> {
    if conn.config.exists() {
        let cfg = JoblyConfig::load(&conn.config)?;
        return match &conn.database {
            Some(url) => Ok(cfg.with_database_url(url.clone())?),
            None => Ok(cfg),
        };
    }

    match &conn.database {
        Some(url) => Ok(JoblyConfig {
            database: DatabaseConfig {
                url: url.clone(),
                pool_size: DEFAULT_POOL_SIZE,
            },
        }),
        None => JoblyConfig::from_env().with_context(|| {
            format!(
                "database URL is required: pass --database, set DATABASE_URL or provide {}",
                conn.config.display()
            )
        }),
    }
}

fn connect(conn: &ConnArgs) -> anyhow::Result<jobly::pool::Pool> {
    let cfg = resolve_config(conn)?;
    Ok(jobly::create_pool_from_config(&cfg.database)?)
}

/// CLI writes run with admin rights as the local user.
fn cli_caller() -> Caller {
    let name = std::env::var("USER").unwrap_or_else(|_| "jobly-cli".to_string());
    Caller::admin(name)
}

pub async fn migrate(conn: ConnArgs) -> anyhow::Result<()> {
    let pool = connect(&conn)?;
    let report = jobly::migrate::run_pool(&pool).await?;
    let applied = report.applied_migrations();
    if applied.is_empty() {
        println!("database is up to date");
    }
    for m in applied {
        println!("applied V{}__{}", m.version(), m.name());
    }
    Ok(())
}

pub async fn companies(conn: ConnArgs, filter: CompanyFilter) -> anyhow::Result<()> {
    let pool = connect(&conn)?;
    let client = pool.get().await.context("failed to get a database connection")?;
    let res = companies::list(&client, &filter).await?;
    println!("{}", render::companies_table(&res.companies));
    Ok(())
}

pub async fn company(conn: ConnArgs, handle: String) -> anyhow::Result<()> {
    let pool = connect(&conn)?;
    let client = pool.get().await.context("failed to get a database connection")?;
    let res = companies::get(&client, &handle).await?;
    println!("{}", render::json(&res)?);
    Ok(())
}

pub async fn patch_company(conn: ConnArgs, handle: String, body: String) -> anyhow::Result<()> {
    // Reject bad input before opening a connection.
    companies::parse_update(&body)?;

    let pool = connect(&conn)?;
    let client = pool.get().await.context("failed to get a database connection")?;
    let res = companies::update(&client, &cli_caller(), &handle, &body).await?;
    println!("{}", render::json(&res)?);
    Ok(())
}

pub async fn jobs(conn: ConnArgs, filter: JobFilter) -> anyhow::Result<()> {
    let pool = connect(&conn)?;
    let client = pool.get().await.context("failed to get a database connection")?;
    let res = jobs::list(&client, &filter).await?;
    println!("{}", render::jobs_table(&res.jobs));
    Ok(())
}

pub async fn job(conn: ConnArgs, id: i32) -> anyhow::Result<()> {
    let pool = connect(&conn)?;
    let client = pool.get().await.context("failed to get a database connection")?;
    let res = jobs::get(&client, id).await?;
    println!("{}", render::json(&res)?);
    Ok(())
}

pub async fn patch_job(conn: ConnArgs, id: i32, body: String) -> anyhow::Result<()> {
    jobs::parse_update(&body)?;

    let pool = connect(&conn)?;
    let client = pool.get().await.context("failed to get a database connection")?;
    let res = jobs::update(&client, &cli_caller(), id, &body).await?;
    println!("{}", render::json(&res)?);
    Ok(())
}
