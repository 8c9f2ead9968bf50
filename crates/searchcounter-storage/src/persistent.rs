//! Persistent storage implementation using redb
//!
//! Two tables back the search history:
//!
//! - `search_history`: key is the zero-based row position (dense, in
//!   insertion order), value is a postcard-encoded [`SearchRow`]
//! - `search_history_by_timestamp`: secondary index keyed by
//!   `(timestamp, position)`, value is the term so the mode query never
//!   touches the main table
//!
//! Both tables are created when the database is opened, so opening an
//! existing file is a no-op for the schema.

use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use searchcounter_core::{Search, SearchId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace};

use crate::SearchStore;
use crate::error::StorageError;
use crate::tally::TermTally;

// Key: row position, Value: serialized SearchRow
const SEARCH_HISTORY: TableDefinition<u64, &[u8]> = TableDefinition::new("search_history");

// Key: (timestamp nanos, row position), Value: term
const TIMESTAMP_INDEX: TableDefinition<(i64, u64), &str> =
    TableDefinition::new("search_history_by_timestamp");

/// One persisted search
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SearchRow {
    /// Hyphenated UUID, always 36 characters
    id: String,
    term: String,
    timestamp: i64,
}

impl From<&Search> for SearchRow {
    fn from(search: &Search) -> Self {
        Self {
            id: search.id().to_string(),
            term: search.term().to_owned(),
            timestamp: search.timestamp(),
        }
    }
}

impl TryFrom<SearchRow> for Search {
    type Error = StorageError;

    fn try_from(row: SearchRow) -> Result<Self, Self::Error> {
        let id = SearchId::parse(&row.id).map_err(|e| StorageError::corrupt(e.to_string()))?;
        Ok(Search::new(id, row.term, row.timestamp))
    }
}

/// Configuration for the redb search store
#[derive(Debug, Clone)]
pub struct RedbStoreConfig {
    /// Path to the database file (need not exist)
    pub db_path: PathBuf,
    /// Cache size in bytes
    pub cache_size: usize,
}

impl Default for RedbStoreConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("./data/searches.redb"),
            cache_size: 16 * 1024 * 1024, // 16MB
        }
    }
}

impl RedbStoreConfig {
    /// Default configuration pointed at `db_path`
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Default::default()
        }
    }
}

/// Durable implementation of SearchStore
///
/// Every append runs in its own write transaction and is committed before
/// returning. A single instance holds the database file lock; open one
/// store per file.
pub struct RedbSearchStore {
    db: Database,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for RedbSearchStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbSearchStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl RedbSearchStore {
    /// Open or create the database
    #[instrument(skip(config), fields(path = %config.db_path.display()))]
    pub fn open(config: RedbStoreConfig) -> Result<Self, StorageError> {
        // Ensure parent directory exists
        if let Some(parent) = config.db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let db = Database::builder()
            .set_cache_size(config.cache_size)
            .create(&config.db_path)?;

        info!("Opened search history database");

        let store = Self {
            db,
            path: Some(config.db_path),
        };
        store.init_tables()?;

        Ok(store)
    }

    /// Open or create the database at `path` with default settings
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open(RedbStoreConfig::at(path.as_ref()))
    }

    /// Create a store backed by redb's in-memory backend
    pub fn in_memory() -> Result<Self, StorageError> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;

        let store = Self { db, path: None };
        store.init_tables()?;

        Ok(store)
    }

    /// Path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Create the tables if they don't exist
    fn init_tables(&self) -> Result<(), StorageError> {
        let write_txn = self.db.begin_write()?;

        write_txn.open_table(SEARCH_HISTORY)?;
        write_txn.open_table(TIMESTAMP_INDEX)?;

        write_txn.commit()?;

        debug!("Initialized search history tables");
        Ok(())
    }

    /// All stored searches in insertion order
    pub fn searches(&self) -> Result<Vec<Search>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let history = read_txn.open_table(SEARCH_HISTORY)?;

        let mut searches = Vec::new();
        for entry in history.iter()? {
            let (_position, value) = entry?;
            let row: SearchRow = postcard::from_bytes(value.value())?;
            searches.push(Search::try_from(row)?);
        }

        Ok(searches)
    }
}

/// Position the next appended row will take, which is also the row count
fn next_position(history: &impl ReadableTable<u64, &'static [u8]>) -> Result<u64, StorageError> {
    Ok(history
        .last()?
        .map(|(position, _)| position.value() + 1)
        .unwrap_or(0))
}

/// Zero-based position of the first row with `timestamp >= cutoff_nanos`
///
/// Reads one entry from the timestamp index. `None` when no row qualifies.
fn first_position(
    index: &impl ReadableTable<(i64, u64), &'static str>,
    cutoff_nanos: i64,
) -> Result<Option<u64>, StorageError> {
    let mut range = index.range((cutoff_nanos, 0u64)..)?;
    match range.next() {
        Some(entry) => {
            let (key, _term) = entry?;
            Ok(Some(key.value().1))
        }
        None => Ok(None),
    }
}

impl SearchStore for RedbSearchStore {
    fn append(&self, search: Search) -> Result<(), StorageError> {
        let row = postcard::to_allocvec(&SearchRow::from(&search))
            .map_err(|e| StorageError::serialization(e.to_string()))?;

        let write_txn = self.db.begin_write()?;
        let position = {
            let mut history = write_txn.open_table(SEARCH_HISTORY)?;
            let position = next_position(&history)?;
            history.insert(position, row.as_slice())?;

            let mut index = write_txn.open_table(TIMESTAMP_INDEX)?;
            index.insert((search.timestamp(), position), search.term())?;

            position
        };
        write_txn.commit()?;

        trace!(id = %search.id(), term = search.term(), position, "Appended search");
        Ok(())
    }

    fn count_since(&self, cutoff_nanos: i64) -> Result<u64, StorageError> {
        let read_txn = self.db.begin_read()?;
        let history = read_txn.open_table(SEARCH_HISTORY)?;
        let index = read_txn.open_table(TIMESTAMP_INDEX)?;

        let total = next_position(&history)?;
        let first = first_position(&index, cutoff_nanos)?.unwrap_or(total);
        let count = total.saturating_sub(first);

        trace!(cutoff = cutoff_nanos, first_position = first, count, "Counted searches");
        Ok(count)
    }

    fn mode_term_since(&self, cutoff_nanos: i64) -> Result<Option<String>, StorageError> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TIMESTAMP_INDEX)?;

        let mut tally = TermTally::new();
        for entry in index.range((cutoff_nanos, 0u64)..)? {
            let (_key, term) = entry?;
            tally.record(term.value());
        }

        trace!(cutoff = cutoff_nanos, window = tally.total(), "Tallied terms");
        Ok(tally.mode())
    }

    fn len(&self) -> Result<u64, StorageError> {
        let read_txn = self.db.begin_read()?;
        let history = read_txn.open_table(SEARCH_HISTORY)?;
        next_position(&history)
    }
}
