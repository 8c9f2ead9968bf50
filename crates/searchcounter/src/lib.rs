//! # Search Counter
//!
//! Sliding-window counter over recorded searches.
//!
//! A [`SearchCounter`] records searches (a random term from its vocabulary,
//! stamped with the current time) into a
//! [`SearchStore`](searchcounter_storage::SearchStore) and answers two
//! windowed queries: how many searches happened in the last N seconds, and
//! which term was searched most often in that window.
//!
//! ## Example
//!
//! ```rust,ignore
//! use searchcounter::SearchCounter;
//! use searchcounter_storage::InMemorySearchStore;
//!
//! let mut counter = SearchCounter::new(["rust", "redb"], InMemorySearchStore::new());
//! counter.record()?;
//!
//! assert_eq!(counter.count_in_last_minute()?, 1);
//! ```

pub mod commands;
pub mod config;
pub mod counter;
pub mod error;

pub use config::{Cli, Command, CounterConfig};
pub use counter::SearchCounter;
pub use error::CounterError;
