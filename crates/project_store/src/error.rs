//! Store error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entity not found.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Duplicate entity (e.g. username or email already taken).
    #[error("{entity_type} already exists: {key}")]
    AlreadyExists {
        entity_type: &'static str,
        key: String,
    },

    /// The (user, task) assignment pair already exists.
    #[error("user {user_id} is already assigned to task {task_id}")]
    AlreadyAssigned { user_id: Uuid, task_id: Uuid },

    /// No assignment exists for the (user, task) pair.
    #[error("user {user_id} is not assigned to task {task_id}")]
    NotAssigned { user_id: Uuid, task_id: Uuid },

    /// A referential constraint blocks the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage-layer failure; the transaction was rolled back.
    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl StoreError {
    /// Creates a not found error.
    pub fn not_found(entity_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            id: id.to_string(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(entity_type: &'static str, key: impl Into<String>) -> Self {
        Self::AlreadyExists {
            entity_type,
            key: key.into(),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
