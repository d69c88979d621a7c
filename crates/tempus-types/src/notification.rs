//! Boundary notifications emitted by the clock engine.
//!
//! Each tick produces at most one notification per boundary kind, delivered
//! in a fixed order over a single broadcast channel: minute, hour, day,
//! week, month, time-of-day. Manual time changes produce a single
//! [`ClockNotification::TimeManuallySet`] instead of retroactive boundary
//! events.

use serde::{Deserialize, Serialize};

use crate::time_of_day::TimeOfDayMarker;

/// A boundary crossing or manual adjustment of the simulated clock.
///
/// The variant set is closed: downstream consumers match on it directly
/// rather than registering per-kind handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClockNotification {
    /// Fired on every tick, unconditionally.
    MinuteChanged {
        /// Total simulated minutes elapsed since the clock epoch.
        total_minutes: u64,
    },

    /// Fired when the hour field changed on this tick.
    HourChanged {
        /// The new hour (0-23).
        hour: u32,
        /// The day the hour belongs to (1-based).
        day: u64,
    },

    /// Fired when the day field changed on this tick.
    DayChanged {
        /// The new day (1-based).
        day: u64,
    },

    /// Fired when a day change landed on the first day of a new week.
    WeekChanged {
        /// The new week (1-based).
        week: u64,
        /// The day that opens the new week.
        first_day: u64,
    },

    /// Fired when a day change crossed into a new month.
    MonthChanged {
        /// The new month (1-based).
        month: u64,
        /// The year the month belongs to (1-based).
        year: u64,
    },

    /// Fired when the tick landed on a marker hour differing from the
    /// last fired marker.
    TimeOfDayChanged {
        /// The marker the clock just reached.
        marker: TimeOfDayMarker,
        /// The day the marker fired on (1-based).
        day: u64,
    },

    /// Fired once after a successful manual `set_time`.
    TimeManuallySet {
        /// Total minutes before the adjustment.
        old_total: u64,
        /// Total minutes after the adjustment.
        new_total: u64,
        /// The day the clock was set to (1-based).
        day: u64,
        /// The hour the clock was set to (0-23).
        hour: u32,
        /// The minute the clock was set to (0-59).
        minute: u32,
    },
}
