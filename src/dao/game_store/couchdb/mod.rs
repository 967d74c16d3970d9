//! CouchDB-backed [`GameStore`](crate::dao::game_store::GameStore) speaking the HTTP API.

mod config;
mod error;
mod models;
mod store;

pub use config::CouchConfig;
pub use error::CouchDaoError;
pub use store::CouchGameStore;

use crate::dao::storage::StorageError;

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::InvalidDocId { doc_id, kind } => StorageError::malformed(doc_id, kind),
            CouchDaoError::DeserializeValue { path, source } => {
                StorageError::malformed(path, source.to_string())
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
