//! Error types for the record store and the todo operations.
//!
//! # Design
//! Two layers. `StoreError` covers everything the embedded database can
//! report plus malformed integers read back from disk. `TodoError` wraps it
//! and adds the validation failures (empty label, bad id, unknown id) that
//! callers are expected to handle as ordinary outcomes rather than faults.

use thiserror::Error;

/// Failures raised by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    /// A stored integer (key or counter value) was not 8 bytes long.
    #[error("malformed integer: expected 8 bytes, got {0}")]
    MalformedInteger(usize),

    /// The per-bucket sequence reached `u64::MAX`.
    #[error("sequence exhausted for bucket {0}")]
    SequenceExhausted(String),

    /// A stored counter is already at `u64::MAX`.
    #[error("counter {0} is at its maximum value")]
    CounterOverflow(String),
}

/// Errors returned by [`Todos`](crate::Todos) operations.
#[derive(Debug, Error)]
pub enum TodoError {
    #[error("empty todo")]
    EmptyLabel,

    /// The id text is not a decimal unsigned integer.
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    #[error("invalid id: no todo with id {0}")]
    NotFound(u64),

    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    /// True for failures caused by caller input rather than by storage.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TodoError::EmptyLabel | TodoError::InvalidId(_) | TodoError::NotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_classified() {
        assert!(TodoError::EmptyLabel.is_validation());
        assert!(TodoError::InvalidId("x".to_string()).is_validation());
        assert!(TodoError::NotFound(3).is_validation());
        assert!(!TodoError::Store(StoreError::MalformedInteger(2)).is_validation());
    }

    #[test]
    fn messages_match_the_page_contract() {
        assert_eq!(TodoError::EmptyLabel.to_string(), "empty todo");
        assert_eq!(TodoError::NotFound(7).to_string(), "invalid id: no todo with id 7");
        assert_eq!(
            StoreError::MalformedInteger(3).to_string(),
            "malformed integer: expected 8 bytes, got 3"
        );
    }
}
