//! Per-world time projection for the Tempus virtual clock.
//!
//! Every world derives its local time from the canonical server clock
//! through a per-world transform: a static minute offset, a speed
//! multiplier, and an optional override rule (a fixed hour, or time that
//! flows backwards). The projection is read-heavy -- renderers and game
//! logic query it far more often than operators reconfigure it -- so the
//! zone table lives behind a reader-favoring lock.
//!
//! # Modules
//!
//! - [`timezone`] -- named zone presets and the [`TimeOverride`] rule set.
//! - [`projector`] -- the [`WorldTimeZones`] table and projection math.
//! - [`sink`] -- the [`VisualTimeSink`] boundary the host implements to
//!   push renderable day/night ticks into its worlds.
//!
//! [`TimeOverride`]: timezone::TimeOverride
//! [`WorldTimeZones`]: projector::WorldTimeZones
//! [`VisualTimeSink`]: sink::VisualTimeSink

pub mod projector;
pub mod sink;
pub mod timezone;

pub use projector::{WorldTimeZone, WorldTimeZones, ZoneError};
pub use sink::{NullVisualSink, VisualTimeSink, WorldDescriptor, WorldEnvironment};
pub use timezone::{TimeOverride, ZonePreset};
