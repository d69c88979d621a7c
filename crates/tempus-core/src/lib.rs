//! Clock engine and registries for the Tempus virtual clock.
//!
//! This crate owns the canonical simulated-minute counter and everything
//! that advances or reads it:
//!
//! # Modules
//!
//! - [`calendar`] -- pure projection from the minute counter to
//!   day/hour/minute/week/month/year and day-of-week.
//! - [`clock`] -- the [`SimulatedClock`] counter with validated manual
//!   adjustment.
//! - [`controls`] -- shared atomic control state for the tick loop
//!   (pause, stop, interval, speed).
//! - [`engine`] -- the [`ClockEngine`]: periodic tick, boundary diffing,
//!   notification emission, persistence orchestration.
//! - [`cooldown`] -- wall-clock and simulated-minute cooldown registry.
//! - [`session`] -- per-entity connection and play-time bookkeeping.
//! - [`config`] -- typed configuration loaded from `tempus-config.yaml`.
//! - [`time_source`] -- the wall-clock abstraction that keeps real-time
//!   expiry testable.
//!
//! [`SimulatedClock`]: clock::SimulatedClock
//! [`ClockEngine`]: engine::ClockEngine

pub mod calendar;
pub mod clock;
pub mod config;
pub mod controls;
pub mod cooldown;
pub mod engine;
pub mod session;
pub mod time_source;
