use mongodb::error::Error as MongoError;
use thiserror::Error;

use crate::dao::models::InstanceId;

pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("missing MongoDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to create game `{id}`")]
    CreateGame {
        id: InstanceId,
        #[source]
        source: MongoError,
    },
    #[error("failed to save game `{id}`")]
    SaveGame {
        id: InstanceId,
        #[source]
        source: MongoError,
    },
    #[error("failed to load game `{id}`")]
    LoadGame {
        id: InstanceId,
        #[source]
        source: MongoError,
    },
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: MongoError,
    },
    #[error("failed to save buggy file `{id}`")]
    SaveBuggyFile {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to load buggy file `{id}`")]
    LoadBuggyFile {
        id: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to list buggy files")]
    ListBuggyFiles {
        #[source]
        source: MongoError,
    },
    #[error("stored game id `{id}` is not a valid UUID")]
    InvalidDocumentId {
        id: String,
        #[source]
        source: uuid::Error,
    },
}
