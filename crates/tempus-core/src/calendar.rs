//! Calendar projection: pure mapping from the minute counter to fields.
//!
//! The engine-local calendar is deliberately simple: 60-minute hours,
//! 24-hour days, 7-day weeks, 30-day months, 360-day years. Every field
//! is recomputed on demand from `total_minutes` with floor division -- the
//! counter is the single source of truth and no field is ever stored
//! independently.

/// Simulated minutes in one day.
pub const MINUTES_PER_DAY: u64 = 1440;

/// Simulated minutes in one hour.
pub const MINUTES_PER_HOUR: u64 = 60;

/// Days in one week.
pub const DAYS_PER_WEEK: u64 = 7;

/// Days in one month.
pub const DAYS_PER_MONTH: u64 = 30;

/// Days in one year.
pub const DAYS_PER_YEAR: u64 = 360;

/// Every calendar field derived from a single minute counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSnapshot {
    /// Total simulated minutes the snapshot was derived from.
    pub total_minutes: u64,
    /// Day since the clock epoch (1-based).
    pub day: u64,
    /// Hour of the day (0-23).
    pub hour: u32,
    /// Minute of the hour (0-59).
    pub minute: u32,
    /// Week since the clock epoch (1-based).
    pub week: u64,
    /// Month since the clock epoch (1-based).
    pub month: u64,
    /// Year since the clock epoch (1-based).
    pub year: u64,
    /// Day of the week (1-7, 1 = first day).
    pub day_of_week: u32,
}

impl CalendarSnapshot {
    /// Project every calendar field from a minute counter.
    pub fn from_total_minutes(total_minutes: u64) -> Self {
        let day = day_of(total_minutes);
        Self {
            total_minutes,
            day,
            hour: hour_of(total_minutes),
            minute: minute_of(total_minutes),
            week: week_of_day(day),
            month: month_of_day(day),
            year: year_of_day(day),
            day_of_week: day_of_week(day),
        }
    }

    /// Render the snapshot as `"<day>일차 HH:MM"`.
    pub fn formatted(&self) -> String {
        format!("{}일차 {:02}:{:02}", self.day, self.hour, self.minute)
    }
}

/// The day a minute counter falls on (1-based).
pub const fn day_of(total_minutes: u64) -> u64 {
    total_minutes / MINUTES_PER_DAY + 1
}

/// The hour of the day a minute counter falls in (0-23).
#[allow(clippy::cast_possible_truncation)]
pub const fn hour_of(total_minutes: u64) -> u32 {
    // minutes-in-day / 60 is always < 24, so the narrowing is exact.
    ((total_minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR) as u32
}

/// The minute of the hour a minute counter falls on (0-59).
#[allow(clippy::cast_possible_truncation)]
pub const fn minute_of(total_minutes: u64) -> u32 {
    // total % 60 is always < 60, so the narrowing is exact.
    (total_minutes % MINUTES_PER_HOUR) as u32
}

/// The week a day falls in (1-based).
pub const fn week_of_day(day: u64) -> u64 {
    day.saturating_sub(1) / DAYS_PER_WEEK + 1
}

/// The month a day falls in (1-based).
pub const fn month_of_day(day: u64) -> u64 {
    day.saturating_sub(1) / DAYS_PER_MONTH + 1
}

/// The year a day falls in (1-based).
pub const fn year_of_day(day: u64) -> u64 {
    day.saturating_sub(1) / DAYS_PER_YEAR + 1
}

/// The day-of-week of a day (1-7, 1 = first day of the week).
#[allow(clippy::cast_possible_truncation)]
pub const fn day_of_week(day: u64) -> u32 {
    // (day - 1) % 7 is always < 7, so the narrowing is exact.
    (day.saturating_sub(1) % DAYS_PER_WEEK + 1) as u32
}

/// Render a minute counter as `"<day>일차 HH:MM"`.
pub fn format_time(total_minutes: u64) -> String {
    CalendarSnapshot::from_total_minutes(total_minutes).formatted()
}
