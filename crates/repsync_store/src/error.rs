//! Error types for the entity store.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing data store failed.
    #[error("backend error: {0}")]
    Backend(String),

    /// Record data could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_display() {
        let err = StoreError::backend("connection reset");
        assert_eq!(err.to_string(), "backend error: connection reset");
    }
}
