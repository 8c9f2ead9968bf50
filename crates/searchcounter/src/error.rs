//! Error types for the counter service

use searchcounter_core::CoreError;
use searchcounter_storage::StorageError;
use thiserror::Error;

/// Errors surfaced by [`SearchCounter`](crate::SearchCounter) and the CLI
///
/// An empty query window is not an error; queries return `Option::None`.
#[derive(Debug, Error)]
pub enum CounterError {
    /// `record` was called on a counter with no search terms
    #[error("Empty vocabulary: no search terms configured")]
    EmptyVocabulary,

    /// Lookback seconds were negative or too large to express in nanoseconds
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] CoreError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CounterError {
    /// Create a new Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
