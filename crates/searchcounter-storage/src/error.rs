//! Error types for searchcounter-storage
//!
//! This module defines the error types used throughout the storage crate.

use thiserror::Error;

/// Errors that can occur in storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    /// I/O error during storage operations
    #[error("I/O error: {0}")]
    Io(String),

    /// Database error (open, transaction, table, or commit failure)
    #[error("Database error: {0}")]
    Database(String),

    /// Error during serialization
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Error during deserialization
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Persisted data violates the table layout
    #[error("Corrupt search history: {0}")]
    Corrupt(String),
}

impl StorageError {
    /// Create a new Serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Create a new Corrupt error
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt(message.into())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Convert from postcard Error to StorageError
impl From<postcard::Error> for StorageError {
    fn from(err: postcard::Error) -> Self {
        StorageError::Deserialization(err.to_string())
    }
}

macro_rules! database_error_from {
    ($($source:ty),* $(,)?) => {
        $(
            impl From<$source> for StorageError {
                fn from(err: $source) -> Self {
                    StorageError::Database(err.to_string())
                }
            }
        )*
    };
}

database_error_from!(
    redb::Error,
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);
