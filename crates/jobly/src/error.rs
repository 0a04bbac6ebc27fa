//! Error types for jobly

use crate::changeset::ValidationErrors;
use thiserror::Error;

/// Result type alias for jobly operations
pub type JoblyResult<T> = Result<T, JoblyError>;

/// Error types for jobly operations
#[derive(Debug, Error)]
pub enum JoblyError {
    /// Malformed or unusable input (e.g. an empty update payload)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// One or more request fields failed validation
    #[error("Validation error: {0}")]
    Validation(ValidationErrors),

    /// Caller lacks the rights for this operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate key on create
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Migration error
    #[cfg(feature = "migrate")]
    #[error("Migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Coarse error classification that callers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    Unauthorized,
    NotFound,
    Conflict,
    Internal,
}

impl ErrorKind {
    /// HTTP status an embedding web layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Internal => 500,
        }
    }
}

impl JoblyError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) | Self::Validation(_) => ErrorKind::InvalidInput,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            _ => ErrorKind::Internal,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Parse a tokio_postgres error into a more specific JoblyError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::Conflict(format!("{}: {}", constraint, message)),
                "23503" | "23514" => {
                    return Self::InvalidInput(format!("{}: {}", constraint, message));
                }
                _ => {}
            }
        }
        Self::Query(err)
    }
}

impl From<ValidationErrors> for JoblyError {
    fn from(errs: ValidationErrors) -> Self {
        Self::Validation(errs)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for JoblyError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(feature = "migrate")]
impl From<refinery::Error> for JoblyError {
    fn from(err: refinery::Error) -> Self {
        Self::Migration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changeset::ValidationCode;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(JoblyError::invalid_input("no data").kind().http_status(), 400);
        assert_eq!(JoblyError::Unauthorized("x".into()).kind().http_status(), 401);
        assert_eq!(JoblyError::not_found("x").kind().http_status(), 404);
        assert_eq!(JoblyError::conflict("x").kind().http_status(), 409);
        assert_eq!(JoblyError::Config("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn validation_is_invalid_input() {
        let mut errs = ValidationErrors::new();
        errs.add("name", ValidationCode::Required, "is required");
        let err = JoblyError::from(errs);
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Validation error: name: is required");
    }
}
