//! Error types for word-bank loading.

/// Errors that can occur while building a [`WordBank`](crate::WordBank).
#[derive(Debug, thiserror::Error)]
pub enum WordError {
    /// The word list is not a JSON object of string arrays.
    #[error("invalid word list: {0}")]
    Parse(#[from] serde_json::Error),

    /// The word list has no usable words at all.
    #[error("word list is empty")]
    Empty,
}
