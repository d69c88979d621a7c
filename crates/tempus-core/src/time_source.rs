//! Wall-clock abstraction for real-time expiry.
//!
//! Wall-clock cooldowns and session bookkeeping measure real elapsed
//! time. Routing every "now" through [`TimeSource`] keeps that arithmetic
//! testable: production code uses [`SystemTimeSource`], tests advance a
//! [`ManualTimeSource`] without sleeping.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Provider of the current wall-clock instant in epoch milliseconds.
pub trait TimeSource: Send + Sync + std::fmt::Debug {
    /// Milliseconds since the Unix epoch.
    fn epoch_millis(&self) -> i64;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn epoch_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A manually-advanced clock for tests.
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    millis: AtomicI64,
}

impl ManualTimeSource {
    /// Create a manual clock starting at the given epoch milliseconds.
    pub const fn new(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    /// Move the clock forward by the given number of milliseconds.
    pub fn advance_millis(&self, delta: i64) {
        let _ = self.millis.fetch_add(delta, Ordering::SeqCst);
    }

    /// Move the clock forward by the given number of seconds.
    pub fn advance_seconds(&self, seconds: i64) {
        self.advance_millis(seconds.saturating_mul(1000));
    }

    /// Set the clock to an absolute epoch-millisecond value.
    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn epoch_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_source_advances() {
        let source = ManualTimeSource::new(1_000);
        assert_eq!(source.epoch_millis(), 1_000);
        source.advance_seconds(3);
        assert_eq!(source.epoch_millis(), 4_000);
        source.set_millis(0);
        assert_eq!(source.epoch_millis(), 0);
    }

    #[test]
    fn system_source_is_monotonic_enough() {
        let source = SystemTimeSource;
        let first = source.epoch_millis();
        let second = source.epoch_millis();
        assert!(second >= first);
    }
}
