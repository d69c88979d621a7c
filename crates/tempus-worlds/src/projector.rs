//! The per-world zone table and projection math.
//!
//! `world_total = trunc(server_total * speed) + offset` -- the
//! multiplication and truncation happen before the offset is added. That
//! ordering is a binding contract: callers tuning a zone rely on the
//! offset shifting *scaled* time, not being scaled along with it.

use std::collections::BTreeMap;

use parking_lot::RwLock;
use tracing::info;

use crate::timezone::{TimeOverride, ZonePreset};

/// Simulated minutes in one day.
const MINUTES_PER_DAY: i64 = 1440;

/// Renderable ticks in one full day/night cycle.
const TICKS_PER_DAY: i64 = 24_000;

/// Errors that can occur while configuring a world zone.
#[derive(Debug, thiserror::Error)]
pub enum ZoneError {
    /// The speed multiplier was zero, negative, or not finite.
    #[error("zone speed must be a positive, finite number (got {speed})")]
    InvalidSpeed {
        /// The rejected multiplier.
        speed: f64,
    },
}

/// One world's transform relative to the canonical server clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldTimeZone {
    /// Static shift in simulated minutes, applied after scaling.
    pub offset_minutes: i64,
    /// Speed multiplier applied to the server counter before the offset.
    pub speed: f64,
    /// Optional projection override.
    pub override_rule: TimeOverride,
}

impl Default for WorldTimeZone {
    fn default() -> Self {
        Self {
            offset_minutes: 0,
            speed: 1.0,
            override_rule: TimeOverride::None,
        }
    }
}

/// The table of configured world zones.
///
/// Reads vastly outnumber writes, and the fixed-hour scan needs a
/// deterministic order, so the table is a [`BTreeMap`] behind a
/// reader-favoring lock rather than a sharded map. Worlds without an
/// entry project with the default transform (offset 0, speed 1.0, no
/// override).
#[derive(Debug, Default)]
pub struct WorldTimeZones {
    zones: RwLock<BTreeMap<String, WorldTimeZone>>,
}

impl WorldTimeZones {
    /// Create an empty zone table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a world's static offset, creating the zone entry if needed.
    pub fn set_offset(&self, world: &str, offset_minutes: i64) {
        let mut zones = self.zones.write();
        zones.entry(world.to_owned()).or_default().offset_minutes = offset_minutes;
    }

    /// Set a world's speed multiplier, creating the zone entry if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneError::InvalidSpeed`] if `speed` is not a positive,
    /// finite number; the table is left unchanged.
    pub fn set_speed(&self, world: &str, speed: f64) -> Result<(), ZoneError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ZoneError::InvalidSpeed { speed });
        }
        let mut zones = self.zones.write();
        zones.entry(world.to_owned()).or_default().speed = speed;
        Ok(())
    }

    /// Set a world's override rule, creating the zone entry if needed.
    pub fn set_override(&self, world: &str, rule: TimeOverride) {
        let mut zones = self.zones.write();
        zones.entry(world.to_owned()).or_default().override_rule = rule;
    }

    /// Apply a named preset: its offset and override rule in one step.
    ///
    /// The world's speed multiplier is left as configured.
    pub fn apply_preset(&self, world: &str, preset: ZonePreset) {
        let mut zones = self.zones.write();
        let zone = zones.entry(world.to_owned()).or_default();
        zone.offset_minutes = preset.offset_minutes();
        zone.override_rule = preset.override_rule();
    }

    /// Return the world's zone, or the default transform if unconfigured.
    pub fn zone(&self, world: &str) -> WorldTimeZone {
        self.zones.read().get(world).copied().unwrap_or_default()
    }

    /// Whether the world has an explicit zone entry.
    pub fn is_configured(&self, world: &str) -> bool {
        self.zones.read().contains_key(world)
    }

    /// Return the names of all configured worlds, in sorted order.
    pub fn configured_worlds(&self) -> Vec<String> {
        self.zones.read().keys().cloned().collect()
    }

    /// Derive a world's local minute counter from the server counter.
    ///
    /// Scaling truncates toward zero before the offset is added. A
    /// [`TimeOverride::ReverseFlow`] zone replaces the static offset with
    /// `-2 * server_total`, so its local time runs backwards.
    pub fn world_total_minutes(&self, world: &str, server_total: u64) -> i64 {
        let zone = self.zone(world);
        let offset = match zone.override_rule {
            TimeOverride::ReverseFlow => reverse_offset(server_total),
            TimeOverride::None | TimeOverride::FixedHour(_) => zone.offset_minutes,
        };
        scale_minutes(server_total, zone.speed).saturating_add(offset)
    }

    /// The world's local day (1-based; truncating division).
    pub fn world_day(&self, world: &str, server_total: u64) -> i64 {
        let total = self.world_total_minutes(world, server_total);
        total
            .checked_div(MINUTES_PER_DAY)
            .unwrap_or(0)
            .saturating_add(1)
    }

    /// The world's local hour (0-23 for non-negative local time).
    pub fn world_hour(&self, world: &str, server_total: u64) -> i64 {
        let total = self.world_total_minutes(world, server_total);
        let minutes_in_day = total.checked_rem(MINUTES_PER_DAY).unwrap_or(0);
        minutes_in_day.checked_div(60).unwrap_or(0)
    }

    /// The world's local minute (0-59 for non-negative local time).
    pub fn world_minute(&self, world: &str, server_total: u64) -> i64 {
        let total = self.world_total_minutes(world, server_total);
        total.checked_rem(60).unwrap_or(0)
    }

    /// The world's local time as `"<day>일차 HH:MM"`.
    pub fn world_formatted_time(&self, world: &str, server_total: u64) -> String {
        format!(
            "{}일차 {:02}:{:02}",
            self.world_day(world, server_total),
            self.world_hour(world, server_total),
            self.world_minute(world, server_total)
        )
    }

    /// The renderable day/night tick value for a world, in `[0, 24000)`.
    ///
    /// The local minute-of-day maps linearly onto the tick cycle. If any
    /// configured zone carries a [`TimeOverride::FixedHour`], every
    /// configured world renders that pinned hour instead -- the first
    /// matching zone in sorted scan order wins when several coexist.
    pub fn visual_ticks(&self, world: &str, server_total: u64) -> u32 {
        if self.is_configured(world) {
            if let Some(fixed_hour) = self.first_fixed_hour() {
                let pinned = i64::from(fixed_hour)
                    .checked_mul(1000)
                    .and_then(|t| t.checked_rem(TICKS_PER_DAY))
                    .unwrap_or(0);
                return u32::try_from(pinned).unwrap_or(0);
            }
        }

        let total = self.world_total_minutes(world, server_total);
        let minutes_in_day = total.rem_euclid(MINUTES_PER_DAY);
        let ticks = minutes_in_day
            .checked_mul(TICKS_PER_DAY)
            .and_then(|t| t.checked_div(MINUTES_PER_DAY))
            .unwrap_or(0);
        u32::try_from(ticks).unwrap_or(0)
    }

    /// Clear every configured zone back to the implicit default.
    pub fn reset_all(&self) {
        let mut zones = self.zones.write();
        let cleared = zones.len();
        zones.clear();
        info!(cleared, "all world timezones reset");
    }

    /// First fixed-hour override in sorted key order, if any.
    fn first_fixed_hour(&self) -> Option<u32> {
        let zones = self.zones.read();
        zones.values().find_map(|zone| match zone.override_rule {
            TimeOverride::FixedHour(hour) => Some(hour),
            TimeOverride::None | TimeOverride::ReverseFlow => None,
        })
    }
}

/// Scale the server counter by a zone speed, truncating toward zero.
///
/// The float multiply-then-truncate is the defined projection, so the
/// lossy casts are intentional here.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn scale_minutes(server_total: u64, speed: f64) -> i64 {
    (server_total as f64 * speed) as i64
}

/// The dynamic offset of a reverse-flow zone: `-2 * server_total`.
fn reverse_offset(server_total: u64) -> i64 {
    i64::try_from(server_total)
        .unwrap_or(i64::MAX)
        .saturating_mul(-2)
}
