//! Runtime configuration.
//!
//! Loaded either from a TOML file:
//!
//! ```toml
//! [database]
//! url = "postgres://${PGUSER}@localhost/jobly"
//! pool_size = 8
//! ```
//!
//! or from the environment (`.env` is honored): `DATABASE_URL` and optional
//! `JOBLY_POOL_SIZE`. `${VAR}` references in file values are expanded from
//! the environment.

use crate::error::{JoblyError, JoblyResult};
use serde::Deserialize;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

#[derive(Debug, Clone, Deserialize)]
pub struct JoblyConfig {
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

/// Default maximum number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 16;

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

impl JoblyConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> JoblyResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            JoblyError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            JoblyError::Config(msg) => JoblyError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse, expand and validate TOML config text.
    pub fn from_toml_str(raw: &str) -> JoblyResult<Self> {
        let mut config: JoblyConfig = toml::from_str(raw)
            .map_err(|e| JoblyError::Config(format!("failed to parse config: {e}")))?;
        config.database.url = expand_env_vars(&config.database.url)?;
        config.validate()?;
        Ok(config)
    }

    /// Build config from `DATABASE_URL` / `JOBLY_POOL_SIZE`, loading `.env` first.
    pub fn from_env() -> JoblyResult<Self> {
        dotenvy::dotenv().ok();

        let url = std::env::var("DATABASE_URL")
            .map_err(|_| JoblyError::Config("DATABASE_URL is not set".to_string()))?;
        let pool_size = match std::env::var("JOBLY_POOL_SIZE") {
            Ok(v) => v.trim().parse::<usize>().map_err(|e| {
                JoblyError::Config(format!("invalid JOBLY_POOL_SIZE {v:?}: {e}"))
            })?,
            Err(_) => default_pool_size(),
        };

        let config = Self {
            database: DatabaseConfig { url, pool_size },
        };
        config.validate()?;
        Ok(config)
    }

    /// Replace the database URL (e.g. from a `--database` flag).
    pub fn with_database_url(mut self, url: impl Into<String>) -> JoblyResult<Self> {
        self.database.url = url.into();
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> JoblyResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(JoblyError::Config("database.url must not be empty".to_string()));
        }
        if self.database.pool_size == 0 {
            return Err(JoblyError::Config("database.pool_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn env_var_re() -> &'static Regex {
    static VAR_RE: OnceLock<Regex> = OnceLock::new();
    VAR_RE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("invalid built-in env var regex")
    })
}

/// Copy `segment`, which must not hold a reference the pattern did not match.
fn push_literal(out: &mut String, segment: &str) -> JoblyResult<()> {
    if let Some(pos) = segment.find("${") {
        return Err(JoblyError::Config(format!(
            "invalid env var reference: {}",
            &segment[pos..]
        )));
    }
    out.push_str(segment);
    Ok(())
}

/// Replace each `${NAME}` in `input` with the value of env var `NAME`.
fn expand_env_vars(input: &str) -> JoblyResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut last = 0;
    for caps in env_var_re().captures_iter(input) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        push_literal(&mut out, &input[last..whole.start()])?;
        let value = std::env::var(name.as_str()).map_err(|_| {
            JoblyError::Config(format!("missing env var for config expansion: {}", name.as_str()))
        })?;
        out.push_str(&value);
        last = whole.end();
    }
    push_literal(&mut out, &input[last..])?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_default_pool_size() {
        let cfg = JoblyConfig::from_toml_str(
            r#"
            [database]
            url = "postgres://localhost/jobly"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.url, "postgres://localhost/jobly");
        assert_eq!(cfg.database.pool_size, 16);
    }

    #[test]
    fn expands_env_references() {
        // PATH is always present in test environments.
        let path = std::env::var("PATH").unwrap();
        let cfg = JoblyConfig::from_toml_str(
            r#"
            [database]
            url = "x${PATH}y"
            pool_size = 2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.database.url, format!("x{path}y"));
        assert_eq!(cfg.database.pool_size, 2);
    }

    #[test]
    fn rejects_bad_values() {
        let empty = JoblyConfig::from_toml_str("[database]\nurl = \"  \"\n");
        assert!(matches!(empty, Err(JoblyError::Config(_))));

        let zero = JoblyConfig::from_toml_str("[database]\nurl = \"x\"\npool_size = 0\n");
        assert!(matches!(zero, Err(JoblyError::Config(_))));

        let unterminated = JoblyConfig::from_toml_str("[database]\nurl = \"${NOPE\"\n");
        assert!(matches!(unterminated, Err(JoblyError::Config(_))));

        let missing =
            JoblyConfig::from_toml_str("[database]\nurl = \"${JOBLY_SURELY_UNSET_VAR_42}\"\n");
        assert!(matches!(missing, Err(JoblyError::Config(_))));
    }

    #[test]
    fn expansion_rejects_malformed_references() {
        assert_eq!(expand_env_vars("postgres://localhost/db").unwrap(), "postgres://localhost/db");
        assert!(expand_env_vars("${}").is_err());
        assert!(expand_env_vars("${PATH}/${").is_err());
        assert!(expand_env_vars("${bad name}").is_err());
        // A lone `$` is not a reference.
        assert_eq!(expand_env_vars("pa$$word").unwrap(), "pa$$word");
    }

    #[test]
    fn with_database_url_overrides() {
        let cfg = JoblyConfig::from_toml_str("[database]\nurl = \"a\"\n")
            .unwrap()
            .with_database_url("postgres://other/db")
            .unwrap();
        assert_eq!(cfg.database.url, "postgres://other/db");
    }
}
