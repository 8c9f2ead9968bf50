//! Error types for the search counter core

use thiserror::Error;

/// Errors raised by core time arithmetic and identifier parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Lookback must be a non-negative number of seconds, got {0}")]
    InvalidLookback(i64),

    #[error("Timestamp arithmetic overflowed the nanosecond range")]
    TimestampOverflow,

    #[error("Invalid search id: {0}")]
    InvalidSearchId(String),
}
