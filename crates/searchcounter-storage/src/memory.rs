//! In-memory storage implementation
//!
//! Keeps the search history in a `Vec` in insertion order. Queries locate
//! the window boundary with a binary search, so they rely on appends being
//! chronological.

use parking_lot::RwLock;
use searchcounter_core::Search;
use tracing::trace;

use crate::SearchStore;
use crate::error::StorageError;
use crate::tally::TermTally;

/// In-memory implementation of SearchStore
///
/// Suitable for tests, simulation, and single-process use where the history
/// does not need to outlive the process.
#[derive(Debug, Default)]
pub struct InMemorySearchStore {
    /// Search history in insertion order
    searches: RwLock<Vec<Search>>,
}

impl InMemorySearchStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `searches`, kept in the given order
    pub fn from_searches(searches: Vec<Search>) -> Self {
        Self {
            searches: RwLock::new(searches),
        }
    }

    /// Copy of the current history
    pub fn snapshot(&self) -> Vec<Search> {
        self.searches.read().clone()
    }
}

/// Zero-based position of the first search with `timestamp >= cutoff_nanos`
///
/// Equals `searches.len()` when every search is older than the cutoff.
fn first_position(searches: &[Search], cutoff_nanos: i64) -> usize {
    searches.partition_point(|search| search.timestamp() < cutoff_nanos)
}

impl SearchStore for InMemorySearchStore {
    fn append(&self, search: Search) -> Result<(), StorageError> {
        trace!(id = %search.id(), term = search.term(), timestamp = search.timestamp(), "Appending search");
        self.searches.write().push(search);
        Ok(())
    }

    fn count_since(&self, cutoff_nanos: i64) -> Result<u64, StorageError> {
        let searches = self.searches.read();
        let first = first_position(&searches, cutoff_nanos);
        let count = searches.len() - first;

        trace!(cutoff = cutoff_nanos, first_position = first, count, "Counted searches");
        Ok(count as u64)
    }

    fn mode_term_since(&self, cutoff_nanos: i64) -> Result<Option<String>, StorageError> {
        let searches = self.searches.read();
        let first = first_position(&searches, cutoff_nanos);

        let tally: TermTally = searches[first..].iter().map(Search::term).collect();
        trace!(cutoff = cutoff_nanos, window = tally.total(), "Tallied terms");

        Ok(tally.mode())
    }

    fn len(&self) -> Result<u64, StorageError> {
        Ok(self.searches.read().len() as u64)
    }
}
