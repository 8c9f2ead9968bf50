//! Search events
//!
//! A [`Search`] is a single recorded event: who it is ([`SearchId`]), what
//! was searched for, and when. Searches order by timestamp only.

use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::time::Clock;

/// Unique identifier for a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchId(Uuid);

impl SearchId {
    /// Length of the hyphenated text form, as persisted
    pub const TEXT_LEN: usize = 36;

    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse the hyphenated text form
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| CoreError::InvalidSearchId(format!("{s}: {e}")))
    }
}

impl Default for SearchId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SearchId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl FromStr for SearchId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for SearchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// A recorded search
///
/// Equality and ordering look at the timestamp only, so two searches made
/// in the same nanosecond compare equal. Use [`Search::id`] to tell them apart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Search {
    id: SearchId,
    term: String,
    timestamp: i64,
}

impl Search {
    /// Create a search from its parts
    pub fn new(id: SearchId, term: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id,
            term: term.into(),
            timestamp,
        }
    }

    /// Create a search with a fresh id, stamped with the clock's current time
    pub fn new_now(term: impl Into<String>, clock: &impl Clock) -> Self {
        Self::new(SearchId::new(), term, clock.now_nanos())
    }

    pub fn id(&self) -> SearchId {
        self.id
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Nanoseconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

impl PartialEq for Search {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Eq for Search {}

impl PartialOrd for Search {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Search {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl Display for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}' @{}", self.id, self.term, self.timestamp)
    }
}
