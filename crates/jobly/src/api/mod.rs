//! Request-level operations.
//!
//! Each function takes an already-identified [`Caller`](crate::auth::Caller)
//! and raw JSON bodies, and returns a serializable response envelope. Mapping
//! [`JoblyError::kind`] to a transport status is left to the embedding server.

pub mod companies;
pub mod jobs;

use crate::error::{JoblyError, JoblyResult};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Parse a JSON request body; malformed or unexpected input is `InvalidInput`.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> JoblyResult<T> {
    serde_json::from_str(body).map_err(|e| JoblyError::invalid_input(e.to_string()))
}

/// `{ "deleted": <key> }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Deleted<K> {
    pub deleted: K,
}

/// A client that fails every statement, for exercising paths that must
/// return before reaching the database.
#[cfg(test)]
pub(crate) struct Offline;

#[cfg(test)]
impl crate::client::GenericClient for Offline {
    async fn query(
        &self,
        _sql: &str,
        _params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> JoblyResult<Vec<tokio_postgres::Row>> {
        Err(JoblyError::Connection("offline".to_string()))
    }

    async fn execute(
        &self,
        _sql: &str,
        _params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> JoblyResult<u64> {
        Err(JoblyError::Connection("offline".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial_update::Payload;

    #[test]
    fn parse_body_maps_json_errors() {
        let err = parse_body::<Payload>("{not json").unwrap_err();
        assert!(matches!(err, JoblyError::InvalidInput(_)));

        let payload: Payload = parse_body(r#"{"name": "x"}"#).unwrap();
        assert_eq!(payload.len(), 1);
    }

    #[test]
    fn deleted_envelope() {
        let json = serde_json::to_string(&Deleted { deleted: "acme" }).unwrap();
        assert_eq!(json, r#"{"deleted":"acme"}"#);
    }
}
