//! Shared type definitions for the Tempus virtual clock.
//!
//! This crate holds the types that cross crate boundaries: the closed
//! [`ClockNotification`] variant set emitted by the clock engine, and the
//! [`TimeOfDayMarker`] phase markers derived from the hour of day.
//!
//! [`ClockNotification`]: notification::ClockNotification
//! [`TimeOfDayMarker`]: time_of_day::TimeOfDayMarker

pub mod notification;
pub mod time_of_day;

pub use notification::ClockNotification;
pub use time_of_day::TimeOfDayMarker;
