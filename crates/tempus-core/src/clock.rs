//! The canonical simulated-minute counter.
//!
//! [`SimulatedClock`] owns `total_minutes` and nothing else. The counter
//! changes through exactly two paths -- the tick increment and a validated
//! manual adjustment -- and every calendar field is derived from it on
//! demand through the [`calendar`](crate::calendar) projection.

use crate::calendar::{self, CalendarSnapshot};

/// Errors that can occur while mutating the clock counter.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The day argument of a manual adjustment was below 1.
    #[error("day must be at least 1 (got {day})")]
    InvalidDay {
        /// The rejected day.
        day: u64,
    },

    /// The hour argument of a manual adjustment was outside 0-23.
    #[error("hour must be between 0 and 23 (got {hour})")]
    InvalidHour {
        /// The rejected hour.
        hour: u32,
    },

    /// The minute argument of a manual adjustment was outside 0-59.
    #[error("minute must be between 0 and 59 (got {minute})")]
    InvalidMinute {
        /// The rejected minute.
        minute: u32,
    },

    /// The speed multiplier was zero, negative, or not finite.
    #[error("time speed must be a positive, finite number (got {speed})")]
    InvalidSpeed {
        /// The rejected multiplier.
        speed: f64,
    },

    /// The minute counter would overflow `u64::MAX`.
    #[error("minute counter overflow: cannot advance beyond u64::MAX")]
    CounterOverflow,
}

/// The canonical minute counter for the whole simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimulatedClock {
    total_minutes: u64,
}

impl SimulatedClock {
    /// Create a clock at the epoch (minute 0).
    pub const fn new() -> Self {
        Self { total_minutes: 0 }
    }

    /// Create a clock restored to a persisted counter value.
    pub const fn from_total_minutes(total_minutes: u64) -> Self {
        Self { total_minutes }
    }

    /// The counter value.
    pub const fn total_minutes(&self) -> u64 {
        self.total_minutes
    }

    /// Advance the counter by exactly one minute. Returns the new value.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::CounterOverflow`] if the counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.total_minutes = self
            .total_minutes
            .checked_add(1)
            .ok_or(ClockError::CounterOverflow)?;
        Ok(self.total_minutes)
    }

    /// Set the counter to an explicit day/hour/minute.
    ///
    /// Validation happens before any mutation: on error the counter is
    /// unchanged. Returns the new counter value on success.
    ///
    /// # Errors
    ///
    /// Returns the matching [`ClockError`] validation variant for a day
    /// below 1, an hour outside 0-23, or a minute outside 0-59.
    pub fn set_time(&mut self, day: u64, hour: u32, minute: u32) -> Result<u64, ClockError> {
        if day < 1 {
            return Err(ClockError::InvalidDay { day });
        }
        if hour > 23 {
            return Err(ClockError::InvalidHour { hour });
        }
        if minute > 59 {
            return Err(ClockError::InvalidMinute { minute });
        }

        let total = day
            .checked_sub(1)
            .and_then(|d| d.checked_mul(calendar::MINUTES_PER_DAY))
            .and_then(|m| m.checked_add(u64::from(hour) * calendar::MINUTES_PER_HOUR))
            .and_then(|m| m.checked_add(u64::from(minute)))
            .ok_or(ClockError::CounterOverflow)?;

        self.total_minutes = total;
        Ok(total)
    }

    /// Project the full calendar snapshot from the current counter.
    pub fn snapshot(&self) -> CalendarSnapshot {
        CalendarSnapshot::from_total_minutes(self.total_minutes)
    }

    /// Render the current time as `"<day>일차 HH:MM"`.
    pub fn formatted_time(&self) -> String {
        calendar::format_time(self.total_minutes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn new_clock_starts_at_epoch() {
        let clock = SimulatedClock::new();
        assert_eq!(clock.total_minutes(), 0);
        assert_eq!(clock.formatted_time(), "1일차 00:00");
    }

    #[test]
    fn advance_increments_by_one() {
        let mut clock = SimulatedClock::new();
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert_eq!(clock.total_minutes(), 2);
    }

    #[test]
    fn advance_at_max_overflows() {
        let mut clock = SimulatedClock::from_total_minutes(u64::MAX);
        assert!(matches!(clock.advance(), Err(ClockError::CounterOverflow)));
        assert_eq!(clock.total_minutes(), u64::MAX);
    }

    #[test]
    fn set_time_round_trips() {
        let mut clock = SimulatedClock::new();
        clock.set_time(3, 15, 30).unwrap();

        let snap = clock.snapshot();
        assert_eq!(snap.day, 3);
        assert_eq!(snap.hour, 15);
        assert_eq!(snap.minute, 30);
        assert_eq!(clock.total_minutes(), 2 * 1440 + 15 * 60 + 30);
    }

    #[test]
    fn invalid_arguments_leave_the_counter_untouched() {
        let mut clock = SimulatedClock::from_total_minutes(777);

        assert!(matches!(
            clock.set_time(0, 5, 5),
            Err(ClockError::InvalidDay { day: 0 })
        ));
        assert!(matches!(
            clock.set_time(1, 24, 5),
            Err(ClockError::InvalidHour { hour: 24 })
        ));
        assert!(matches!(
            clock.set_time(1, 5, 60),
            Err(ClockError::InvalidMinute { minute: 60 })
        ));
        assert_eq!(clock.total_minutes(), 777);
    }

    #[test]
    fn boundary_arguments_are_accepted() {
        let mut clock = SimulatedClock::new();
        assert_eq!(clock.set_time(1, 0, 0).unwrap(), 0);
        assert_eq!(clock.set_time(1, 23, 59).unwrap(), 1439);
    }
}
