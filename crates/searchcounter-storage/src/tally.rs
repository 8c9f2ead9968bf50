//! Term frequency tally shared by both backends

use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct TermCount {
    occurrences: u64,
    first_seen: usize,
}

/// Counts term occurrences in the order they are fed in
///
/// [`TermTally::mode`] returns the most frequent term. Ties go to the term
/// that was recorded first, so the result is deterministic for a given
/// input order.
#[derive(Debug, Default)]
pub struct TermTally {
    counts: HashMap<String, TermCount>,
    seen: usize,
}

impl TermTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `term`
    pub fn record(&mut self, term: &str) {
        match self.counts.get_mut(term) {
            Some(count) => count.occurrences += 1,
            None => {
                self.counts.insert(
                    term.to_owned(),
                    TermCount {
                        occurrences: 1,
                        first_seen: self.seen,
                    },
                );
            }
        }
        self.seen += 1;
    }

    /// Total occurrences recorded
    pub fn total(&self) -> usize {
        self.seen
    }

    /// Occurrences of a single term
    pub fn occurrences(&self, term: &str) -> u64 {
        self.counts.get(term).map_or(0, |count| count.occurrences)
    }

    /// The most frequent term, or `None` if nothing was recorded
    pub fn mode(self) -> Option<String> {
        self.counts
            .into_iter()
            .min_by(|(_, a), (_, b)| {
                b.occurrences
                    .cmp(&a.occurrences)
                    .then(a.first_seen.cmp(&b.first_seen))
            })
            .map(|(term, _)| term)
    }
}

impl<'a> FromIterator<&'a str> for TermTally {
    fn from_iter<T: IntoIterator<Item = &'a str>>(iter: T) -> Self {
        let mut tally = Self::new();
        for term in iter {
            tally.record(term);
        }
        tally
    }
}
