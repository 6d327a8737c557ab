//! Error taxonomy for the retrieval core.
//!
//! Ranking never fails for a built [`Index`](crate::index::Index); the only
//! failure points are chunker configuration and the one-time document load.

/// Result alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The document source could not be read at ingestion time.
    #[error("document unavailable ({source_name}): {reason}")]
    DocumentUnavailable { source_name: String, reason: String },

    /// Chunker parameters violate `0 < overlap < chunk_size`.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl RetrievalError {
    pub fn unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        RetrievalError::DocumentUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}
