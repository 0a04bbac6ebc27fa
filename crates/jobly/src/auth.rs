//! Caller identity and the admin gate for writes.
//!
//! Authenticating the caller is left to the embedding application; this module
//! only decides what an already-identified caller may do.

use crate::error::{JoblyError, JoblyResult};

/// The identity a request runs as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub username: Option<String>,
    pub is_admin: bool,
}

impl Caller {
    /// No logged-in user.
    pub fn anonymous() -> Self {
        Self {
            username: None,
            is_admin: false,
        }
    }

    pub fn user(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: false,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            is_admin: true,
        }
    }
}

/// Fail with [`JoblyError::Unauthorized`] unless `caller` is an admin.
pub fn ensure_admin(caller: &Caller) -> JoblyResult<()> {
    if caller.is_admin {
        Ok(())
    } else {
        tracing::debug!(target: "jobly", user = caller.username.as_deref().unwrap_or("-"), "admin required");
        Err(JoblyError::Unauthorized("Admin rights required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_pass() {
        assert!(ensure_admin(&Caller::admin("root")).is_ok());
        assert!(matches!(
            ensure_admin(&Caller::user("bob")),
            Err(JoblyError::Unauthorized(_))
        ));
        assert!(ensure_admin(&Caller::anonymous()).is_err());
    }
}
