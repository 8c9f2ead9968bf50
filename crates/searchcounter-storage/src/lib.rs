//! # Search Counter Storage
//!
//! Storage backends for recorded searches.
//!
//! Both backends keep an append-only history of [`Search`] events and answer
//! the same two windowed queries with identical results:
//!
//! - **count_since**: how many searches have `timestamp >= cutoff`
//! - **mode_term_since**: the most frequent term among those searches
//!
//! ## Features
//!
//! - **SearchStore trait**: The capability interface the counter service uses
//! - **InMemorySearchStore**: Ordered in-memory log, binary-searched per query
//! - **RedbSearchStore**: Durable redb table with a secondary timestamp index
//! - **TermTally**: Frequency tally with a first-seen tie-break
//!
//! ## Example
//!
//! ```rust,ignore
//! use searchcounter_core::{Search, SearchId};
//! use searchcounter_storage::{InMemorySearchStore, SearchStore};
//!
//! let store = InMemorySearchStore::new();
//! store.append(Search::new(SearchId::new(), "rust", 10)).unwrap();
//! store.append(Search::new(SearchId::new(), "redb", 20)).unwrap();
//!
//! assert_eq!(store.count_since(15).unwrap(), 1);
//! assert_eq!(store.mode_term_since(0).unwrap().as_deref(), Some("rust"));
//! ```

pub mod error;
pub mod memory;
pub mod persistent;
pub mod tally;

// Re-exports
pub use error::StorageError;
pub use memory::InMemorySearchStore;
pub use persistent::{RedbSearchStore, RedbStoreConfig};
pub use tally::TermTally;

use std::sync::Arc;

use searchcounter_core::Search;

/// Append-only history of searches with windowed queries
///
/// Implementations assume searches are appended in roughly chronological
/// order. The window boundary is located by searching over insertion order,
/// so an out-of-order append can make a boundary query stale by the size of
/// the disorder.
///
/// All cutoffs are inclusive: a search whose timestamp equals the cutoff is
/// inside the window.
pub trait SearchStore: Send + Sync {
    /// Append a search to the end of the history
    ///
    /// # Errors
    ///
    /// Returns an error if the search cannot be persisted. The durable
    /// backend commits before returning.
    fn append(&self, search: Search) -> Result<(), StorageError>;

    /// Count searches with `timestamp >= cutoff_nanos`
    fn count_since(&self, cutoff_nanos: i64) -> Result<u64, StorageError>;

    /// Most frequent term among searches with `timestamp >= cutoff_nanos`
    ///
    /// Ties go to the term seen first. The in-memory store walks insertion
    /// order and the redb store walks `(timestamp, position)` order, so the
    /// two agree only when searches were appended chronologically.
    ///
    /// # Returns
    ///
    /// `None` if no search falls inside the window.
    fn mode_term_since(&self, cutoff_nanos: i64) -> Result<Option<String>, StorageError>;

    /// Total number of searches stored
    fn len(&self) -> Result<u64, StorageError>;

    /// Check if the history is empty
    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

impl<T: SearchStore + ?Sized> SearchStore for Box<T> {
    fn append(&self, search: Search) -> Result<(), StorageError> {
        (**self).append(search)
    }

    fn count_since(&self, cutoff_nanos: i64) -> Result<u64, StorageError> {
        (**self).count_since(cutoff_nanos)
    }

    fn mode_term_since(&self, cutoff_nanos: i64) -> Result<Option<String>, StorageError> {
        (**self).mode_term_since(cutoff_nanos)
    }

    fn len(&self) -> Result<u64, StorageError> {
        (**self).len()
    }
}

impl<T: SearchStore + ?Sized> SearchStore for Arc<T> {
    fn append(&self, search: Search) -> Result<(), StorageError> {
        (**self).append(search)
    }

    fn count_since(&self, cutoff_nanos: i64) -> Result<u64, StorageError> {
        (**self).count_since(cutoff_nanos)
    }

    fn mode_term_since(&self, cutoff_nanos: i64) -> Result<Option<String>, StorageError> {
        (**self).mode_term_since(cutoff_nanos)
    }

    fn len(&self) -> Result<u64, StorageError> {
        (**self).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchcounter_core::SearchId;

    /// Test that the SearchStore trait is object-safe
    fn _assert_object_safe(_: &dyn SearchStore) {}

    #[test]
    fn test_boxed_store_delegates() {
        let store: Box<dyn SearchStore> = Box::new(InMemorySearchStore::new());
        assert!(store.is_empty().unwrap());

        store.append(Search::new(SearchId::new(), "boxed", 5)).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.count_since(5).unwrap(), 1);
        assert_eq!(store.mode_term_since(0).unwrap().as_deref(), Some("boxed"));
    }

    #[test]
    fn test_shared_store_sees_appends() {
        let store = Arc::new(InMemorySearchStore::new());
        let handle = Arc::clone(&store);

        handle.append(Search::new(SearchId::new(), "shared", 1)).unwrap();

        assert_eq!(SearchStore::len(&store).unwrap(), 1);
    }
}
