//! Time utilities and the clock abstraction
//!
//! All timestamps are `i64` nanoseconds since the Unix epoch. Queries read
//! the clock once and derive their cutoff from that single reading.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

use crate::error::CoreError;

/// Nanoseconds in one second
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Lookback used by "last minute" queries
pub const SECONDS_PER_MINUTE: i64 = 60;

/// Convert a whole number of seconds into nanoseconds
///
/// # Errors
///
/// Returns [`CoreError::InvalidLookback`] for negative input and
/// [`CoreError::TimestampOverflow`] if the result does not fit in an `i64`.
pub fn seconds_to_nanos(seconds: i64) -> Result<i64, CoreError> {
    if seconds < 0 {
        return Err(CoreError::InvalidLookback(seconds));
    }
    seconds
        .checked_mul(NANOS_PER_SECOND)
        .ok_or(CoreError::TimestampOverflow)
}

/// Start of the lookback window `[now - seconds, now]`
pub fn lookback_cutoff(now_nanos: i64, seconds: i64) -> Result<i64, CoreError> {
    now_nanos
        .checked_sub(seconds_to_nanos(seconds)?)
        .ok_or(CoreError::TimestampOverflow)
}

/// Time abstraction for testability
///
/// Lets tests drive time explicitly instead of sleeping on the wall clock.
pub trait Clock: Send + Sync {
    /// Current time in nanoseconds since the Unix epoch
    fn now_nanos(&self) -> i64;
}

/// Real clock implementation using system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_nanos(&self) -> i64 {
        // chrono only fails past the year 2262
        Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX)
    }
}

/// Clock whose time only moves when told to
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock fixed at `now_nanos`
    pub fn new(now_nanos: i64) -> Self {
        Self {
            now: AtomicI64::new(now_nanos),
        }
    }

    /// Create a clock fixed at a whole number of seconds since the epoch
    pub fn at_seconds(seconds: i64) -> Self {
        Self::new(seconds.saturating_mul(NANOS_PER_SECOND))
    }

    /// Jump to an absolute time
    pub fn set(&self, now_nanos: i64) {
        self.now.store(now_nanos, Ordering::SeqCst);
    }

    /// Move forward (or backward, for negative input) by `delta_nanos`
    pub fn advance(&self, delta_nanos: i64) {
        self.now.fetch_add(delta_nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_nanos(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_nanos(&self) -> i64 {
        (**self).now_nanos()
    }
}
