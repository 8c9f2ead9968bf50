//! The search counter service
//!
//! [`SearchCounter`] records new searches and answers windowed queries by
//! delegating to a [`SearchStore`]. Time and randomness are injected so the
//! service is deterministic under test.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use searchcounter_core::{Clock, SECONDS_PER_MINUTE, Search, SystemClock, lookback_cutoff};
use searchcounter_storage::SearchStore;
use tracing::debug;

use crate::error::CounterError;

/// Sliding-window counter over a search store
///
/// Holds one store for its whole lifetime. Each query reads the clock once
/// and uses that reading for the whole operation.
pub struct SearchCounter<S, C = SystemClock, R = StdRng> {
    terms: Vec<String>,
    store: S,
    clock: C,
    rng: R,
}

impl<S: SearchStore> SearchCounter<S> {
    /// Create a counter using the system clock and an OS-seeded RNG
    pub fn new<T: Into<String>>(terms: impl IntoIterator<Item = T>, store: S) -> Self {
        Self::with_parts(terms, store, SystemClock, StdRng::from_os_rng())
    }
}

impl<S, C, R> SearchCounter<S, C, R>
where
    S: SearchStore,
    C: Clock,
    R: Rng,
{
    /// Create a counter with an explicit clock and random source
    pub fn with_parts<T: Into<String>>(
        terms: impl IntoIterator<Item = T>,
        store: S,
        clock: C,
        rng: R,
    ) -> Self {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            store,
            clock,
            rng,
        }
    }

    /// Record a search for a randomly chosen term, stamped with the current time
    ///
    /// Returns the search as stored.
    ///
    /// # Errors
    ///
    /// [`CounterError::EmptyVocabulary`] if the counter has no terms, or a
    /// storage error if the append fails.
    pub fn record(&mut self) -> Result<Search, CounterError> {
        let term = self
            .terms
            .choose(&mut self.rng)
            .ok_or(CounterError::EmptyVocabulary)?;
        let search = Search::new_now(term.as_str(), &self.clock);

        self.store.append(search.clone())?;
        debug!(id = %search.id(), term = search.term(), timestamp = search.timestamp(), "Recorded search");

        Ok(search)
    }

    /// Number of searches in the last 60 seconds
    pub fn count_in_last_minute(&self) -> Result<u64, CounterError> {
        self.count_in_last_seconds(SECONDS_PER_MINUTE)
    }

    /// Number of searches in `[now - seconds, now]`
    ///
    /// # Errors
    ///
    /// [`CounterError::InvalidArgument`] if `seconds` is negative.
    pub fn count_in_last_seconds(&self, seconds: i64) -> Result<u64, CounterError> {
        let cutoff = self.cutoff(seconds)?;
        Ok(self.store.count_since(cutoff)?)
    }

    /// Most frequent term in `[now - seconds, now]`, `None` if the window is empty
    pub fn most_common_term_in_last_seconds(
        &self,
        seconds: i64,
    ) -> Result<Option<String>, CounterError> {
        let cutoff = self.cutoff(seconds)?;
        Ok(self.store.mode_term_since(cutoff)?)
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn cutoff(&self, seconds: i64) -> Result<i64, CounterError> {
        Ok(lookback_cutoff(self.clock.now_nanos(), seconds)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use searchcounter_core::{CoreError, ManualClock, NANOS_PER_SECOND};
    use searchcounter_storage::InMemorySearchStore;

    const SECONDS_NOW: i64 = 1_569_887_365;

    fn test_counter(
        terms: &[&str],
    ) -> (SearchCounter<InMemorySearchStore, Arc<ManualClock>>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at_seconds(SECONDS_NOW));
        let counter = SearchCounter::with_parts(
            terms.iter().copied(),
            InMemorySearchStore::new(),
            Arc::clone(&clock),
            StdRng::seed_from_u64(42),
        );
        (counter, clock)
    }

    #[test]
    fn test_record_appends_to_store() {
        let (mut counter, _clock) = test_counter(&["term0", "term1", "term2"]);

        counter.record().unwrap();
        assert_eq!(counter.store().len().unwrap(), 1);

        counter.record().unwrap();
        assert_eq!(counter.store().len().unwrap(), 2);
    }

    #[test]
    fn test_record_uses_vocabulary_and_clock() {
        let (mut counter, _clock) = test_counter(&["only"]);

        let search = counter.record().unwrap();

        assert_eq!(search.term(), "only");
        assert_eq!(search.timestamp(), SECONDS_NOW * NANOS_PER_SECOND);
    }

    #[test]
    fn test_record_with_empty_vocabulary_fails() {
        let (mut counter, _clock) = test_counter(&[]);

        let err = counter.record().unwrap_err();
        assert!(matches!(err, CounterError::EmptyVocabulary));
        assert!(counter.store().is_empty().unwrap());
    }

    #[test]
    fn test_count_in_last_minute() {
        let (mut counter, clock) = test_counter(&["term0", "term1", "term2"]);
        let now = clock.now_nanos();

        clock.set(now - 61 * NANOS_PER_SECOND);
        counter.record().unwrap();

        clock.set(now - 30 * NANOS_PER_SECOND);
        counter.record().unwrap();

        clock.set(now);
        counter.record().unwrap();

        assert_eq!(counter.count_in_last_minute().unwrap(), 2);
    }

    #[test]
    fn test_negative_lookback_is_invalid() {
        let (counter, _clock) = test_counter(&["term0"]);

        let err = counter.count_in_last_seconds(-1).unwrap_err();
        assert!(matches!(
            err,
            CounterError::InvalidArgument(CoreError::InvalidLookback(-1))
        ));

        let err = counter.most_common_term_in_last_seconds(-5).unwrap_err();
        assert!(matches!(err, CounterError::InvalidArgument(_)));
    }

    #[test]
    fn test_zero_lookback_counts_only_now() {
        let (mut counter, clock) = test_counter(&["term0"]);
        assert_eq!(counter.count_in_last_seconds(0).unwrap(), 0);

        clock.advance(-NANOS_PER_SECOND);
        counter.record().unwrap();
        clock.advance(NANOS_PER_SECOND);
        counter.record().unwrap();

        assert_eq!(counter.count_in_last_seconds(0).unwrap(), 1);
    }

    #[test]
    fn test_empty_window_has_no_term() {
        let (counter, _clock) = test_counter(&["term0"]);
        assert_eq!(counter.most_common_term_in_last_seconds(60).unwrap(), None);
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let terms = ["a", "b", "c", "d"];
        let (mut first, _) = test_counter(&terms);
        let (mut second, _) = test_counter(&terms);

        for _ in 0..20 {
            assert_eq!(first.record().unwrap().term(), second.record().unwrap().term());
        }
        assert_eq!(first.terms().len(), 4);
    }
}
