//! Typed errors returned by engine and store operations.

use crate::persist::PersistError;
use thiserror::Error;

/// Errors from core operations.
///
/// Validation and range errors are raised before any state change, so a
/// rejected command leaves the aggregate untouched. Dangling references are
/// not an error at write time; they surface through the resolver at read
/// time instead.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required field is missing or a field-level invariant is violated.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A placed or moved time falls outside the owning timeline's bounds.
    #[error("time {time} is outside timeline bounds {start}..={end}")]
    Range { time: i64, start: i64, end: i64 },

    /// An operation addressed an id that does not exist.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Persistence failed while writing a snapshot.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl CoreError {
    /// Create a validation error with a message.
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    /// Create a not-found error for an entity kind and id.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}
