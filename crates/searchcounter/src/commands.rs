//! Command execution for the CLI
//!
//! Output goes to the supplied writer so commands can be driven from tests.

use std::io::Write;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use searchcounter_core::{Clock, ManualClock, SystemClock};
use searchcounter_storage::{InMemorySearchStore, RedbSearchStore, SearchStore};
use tracing::info;

use crate::config::{Command, CounterConfig};
use crate::counter::SearchCounter;
use crate::error::CounterError;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// Run one CLI command against the configured backend
pub fn execute(
    command: &Command,
    config: &CounterConfig,
    out: &mut impl Write,
) -> Result<(), CounterError> {
    match command {
        Command::Increment { terms } => {
            let terms = if terms.is_empty() {
                config.terms.clone()
            } else {
                terms.clone()
            };
            let mut counter = open_counter(config, terms)?;
            let search = counter.record()?;
            info!(id = %search.id(), term = search.term(), "Incremented search count");
        }
        Command::NumLastMinute => {
            let counter = open_counter(config, Vec::<String>::new())?;
            writeln!(out, "{}", counter.count_in_last_minute()?)?;
        }
        Command::NumArbitraryLookback { seconds } => {
            let counter = open_counter(config, Vec::<String>::new())?;
            writeln!(out, "{}", counter.count_in_last_seconds(*seconds)?)?;
        }
        Command::MostCommonTerm { seconds } => {
            let counter = open_counter(config, Vec::<String>::new())?;
            if let Some(term) = counter.most_common_term_in_last_seconds(*seconds)? {
                writeln!(out, "{term}")?;
            }
        }
        Command::Simulate {
            count,
            spacing_ms,
            terms,
            seed,
        } => {
            let terms = if terms.is_empty() {
                config.terms.clone()
            } else {
                terms.clone()
            };
            simulate(*count, *spacing_ms, terms, *seed, out)?;
        }
    }

    Ok(())
}

fn open_counter(
    config: &CounterConfig,
    terms: Vec<String>,
) -> Result<SearchCounter<RedbSearchStore>, CounterError> {
    let store = RedbSearchStore::open(config.store_config()?)?;
    Ok(SearchCounter::new(terms, store))
}

/// Record `count` searches `spacing_ms` apart on a simulated clock, then report
fn simulate(
    count: usize,
    spacing_ms: u64,
    terms: Vec<String>,
    seed: Option<u64>,
    out: &mut impl Write,
) -> Result<(), CounterError> {
    let spacing_nanos = i64::try_from(spacing_ms)
        .ok()
        .and_then(|ms| ms.checked_mul(NANOS_PER_MILLI))
        .ok_or_else(|| CounterError::config(format!("spacing of {spacing_ms}ms is too large")))?;

    let clock = Arc::new(ManualClock::new(SystemClock.now_nanos()));
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let store: Box<dyn SearchStore> = Box::new(InMemorySearchStore::new());
    let mut counter = SearchCounter::with_parts(terms, store, Arc::clone(&clock), rng);

    for _ in 0..count {
        counter.record()?;
        clock.advance(spacing_nanos);
    }
    info!(count, spacing_ms, "Simulation finished");

    writeln!(out, "searches: {}", counter.store().len()?)?;
    writeln!(out, "last_minute: {}", counter.count_in_last_minute()?)?;
    match counter.most_common_term_in_last_seconds(60)? {
        Some(term) => writeln!(out, "most_common_term: {term}")?,
        None => writeln!(out, "most_common_term: -")?,
    }

    Ok(())
}
