use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

use crate::{dao::storage::StorageError, state::GameError};

/// Message returned when an operation targets an unknown instance.
pub const GAME_NOT_FOUND: &str = "Game requested does not exist.";

/// Errors surfaced by the manager and corpus services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A game rule rejected the request; the message is the rule's own text.
    #[error(transparent)]
    Rule(#[from] GameError),
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// A stored record cannot be used.
    #[error("data integrity: {0}")]
    Integrity(String),
    /// Invalid input provided by the caller.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Requested resource was not found.
    #[error("{0}")]
    NotFound(String),
}

impl ServiceError {
    pub fn game_not_found() -> Self {
        ServiceError::NotFound(GAME_NOT_FOUND.into())
    }

    /// Whether the error points at corrupt or missing data rather than a bad request.
    pub fn is_integrity(&self) -> bool {
        match self {
            ServiceError::Rule(err) => err.is_integrity(),
            ServiceError::Integrity(_) => true,
            _ => false,
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Malformed { .. } => ServiceError::Integrity(err.to_string()),
            other => ServiceError::Unavailable(other),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidInput(format!("validation failed: {}", err))
    }
}

/// Wire shape of a failed operation: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        Self {
            error: err.to_string(),
        }
    }
}

impl From<ServiceError> for ErrorBody {
    fn from(err: ServiceError) -> Self {
        (&err).into()
    }
}
