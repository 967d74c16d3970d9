//! Errors raised by the CouchDB game store.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for CouchDB store operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// Failures that can occur while talking to CouchDB.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// A required `COUCH_*` variable is not set.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// Probing the database failed before a response arrived.
    #[error("failed to query CouchDB database `{database}`")]
    DatabaseQuery {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    /// Creating the missing database failed.
    #[error("failed to create CouchDB database `{database}`")]
    DatabaseCreate {
        database: String,
        #[source]
        source: reqwest::Error,
    },
    /// Database probe or creation answered with an unexpected status.
    #[error("unexpected CouchDB database response status {status} for `{database}`")]
    DatabaseStatus {
        database: String,
        status: StatusCode,
    },
    /// A document request could not be sent.
    #[error("failed to send CouchDB request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// A document request answered with an unexpected status.
    #[error("unexpected CouchDB response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// The response body was not valid JSON.
    #[error("failed to decode CouchDB response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// A listed row did not match the expected document shape.
    #[error("failed to deserialize CouchDB value for `{path}`")]
    DeserializeValue {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    /// A document id lacks its prefix or carries a malformed game id.
    #[error("invalid document ID `{doc_id}`: {kind}")]
    InvalidDocId { doc_id: String, kind: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::storage::StorageError;

    #[test]
    fn document_errors_become_malformed_records() {
        let err = CouchDaoError::InvalidDocId {
            doc_id: "game::nope".into(),
            kind: "invalid uuid",
        };
        assert_eq!(err.to_string(), "invalid document ID `game::nope`: invalid uuid");
        assert!(matches!(
            StorageError::from(err),
            StorageError::Malformed { .. }
        ));

        let status = CouchDaoError::RequestStatus {
            path: "bughunt/game::x".into(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        };
        assert!(matches!(
            StorageError::from(status),
            StorageError::Unavailable { .. }
        ));
    }
}
