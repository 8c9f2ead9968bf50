//! # Search Counter Core
//!
//! Core types, clock abstraction, and errors shared by the storage backends
//! and the counter service.
//!
//! ## Key Types
//!
//! - [`Search`]: A recorded search event, ordered by timestamp
//! - [`SearchId`]: Unique identifier assigned to each search
//! - [`Clock`]: Time abstraction for testability ([`SystemClock`], [`ManualClock`])
//! - [`CoreError`]: Errors raised while deriving lookback windows or parsing ids

pub mod error;
pub mod search;
pub mod time;

// Re-export main types
pub use error::*;
pub use search::*;
pub use time::*;
