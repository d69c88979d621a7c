//! Named expiring cooldowns in two time bases.
//!
//! Gameplay logic checks cooldowns on nearly every interaction, while
//! arming one is comparatively rare, so both kinds live behind
//! reader-favoring locks: any number of checks proceed concurrently and
//! only the occasional arm or removal takes a write lock. The registry
//! never shares a lock with the engine's tick path.
//!
//! The two kinds share one keyspace contract: ids are caller-chosen
//! strings (callers namespace them, e.g. by prefixing an entity id), at
//! most one entry per id per kind, and a repeated `set` replaces the
//! previous entry. An unknown id is defined as "already expired" -- never
//! an error.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tempus_store::PersistedCooldown;

use crate::time_source::TimeSource;

/// A wall-clock cooldown entry: when it was armed and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WallClockEntry {
    /// Epoch milliseconds at which the cooldown was armed.
    started_at_millis: i64,
    /// Cooldown duration in milliseconds.
    duration_millis: i64,
}

/// Registry of wall-clock and simulated-minute cooldowns.
///
/// Wall-clock entries store their duration; simulated entries store only
/// the arming minute, and the caller supplies the duration on every check
/// (a quirk of the legacy time base kept for compatibility -- the caller
/// must pass the same duration consistently).
#[derive(Debug)]
pub struct CooldownRegistry {
    wall: RwLock<HashMap<String, WallClockEntry>>,
    simulated: RwLock<HashMap<String, u64>>,
    time_source: Arc<dyn TimeSource>,
}

impl CooldownRegistry {
    /// Create an empty registry reading "now" from the given source.
    pub fn new(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            wall: RwLock::new(HashMap::new()),
            simulated: RwLock::new(HashMap::new()),
            time_source,
        }
    }

    // -----------------------------------------------------------------------
    // Wall-clock cooldowns
    // -----------------------------------------------------------------------

    /// Arm (or re-arm) a wall-clock cooldown for `duration_seconds`.
    pub fn set(&self, id: &str, duration_seconds: u64) {
        let entry = WallClockEntry {
            started_at_millis: self.time_source.epoch_millis(),
            duration_millis: i64::try_from(duration_seconds)
                .unwrap_or(i64::MAX)
                .saturating_mul(1000),
        };
        self.wall.write().insert(id.to_owned(), entry);
    }

    /// Whether the cooldown has expired. Unknown ids are expired.
    pub fn is_over(&self, id: &str) -> bool {
        self.wall.read().get(id).is_none_or(|entry| {
            let elapsed = self
                .time_source
                .epoch_millis()
                .saturating_sub(entry.started_at_millis);
            elapsed >= entry.duration_millis
        })
    }

    /// Remaining wall-clock seconds, floored at 0. Unknown ids report 0.
    pub fn remaining_seconds(&self, id: &str) -> u64 {
        self.wall.read().get(id).map_or(0, |entry| {
            let elapsed = self
                .time_source
                .epoch_millis()
                .saturating_sub(entry.started_at_millis);
            let remaining = entry.duration_millis.saturating_sub(elapsed);
            u64::try_from(remaining / 1000).unwrap_or(0)
        })
    }

    // -----------------------------------------------------------------------
    // Simulated-minute cooldowns (legacy time base)
    // -----------------------------------------------------------------------

    /// Arm (or re-arm) a simulated cooldown at the given minute counter.
    pub fn set_simulated(&self, id: &str, now_minutes: u64) {
        self.simulated.write().insert(id.to_owned(), now_minutes);
    }

    /// Whether the simulated cooldown has expired, given the caller's
    /// duration and the current minute counter. Unknown ids are expired.
    pub fn is_simulated_over(&self, id: &str, duration_minutes: u64, now_minutes: u64) -> bool {
        self.simulated
            .read()
            .get(id)
            .is_none_or(|started| now_minutes.saturating_sub(*started) >= duration_minutes)
    }

    /// Remaining simulated minutes, floored at 0. Unknown ids report 0.
    pub fn remaining_simulated_minutes(
        &self,
        id: &str,
        duration_minutes: u64,
        now_minutes: u64,
    ) -> u64 {
        self.simulated.read().get(id).map_or(0, |started| {
            let elapsed = now_minutes.saturating_sub(*started);
            duration_minutes.saturating_sub(elapsed)
        })
    }

    // -----------------------------------------------------------------------
    // Shared keyspace operations
    // -----------------------------------------------------------------------

    /// Delete the id from both kinds' storage. Idempotent.
    pub fn remove(&self, id: &str) {
        let _ = self.wall.write().remove(id);
        let _ = self.simulated.write().remove(id);
    }

    /// Number of live wall-clock entries.
    pub fn wall_clock_len(&self) -> usize {
        self.wall.read().len()
    }

    // -----------------------------------------------------------------------
    // Persistence bridging
    // -----------------------------------------------------------------------

    /// Export every wall-clock entry for the snapshot store.
    ///
    /// Simulated-minute entries are deliberately not persisted: their
    /// durations live with the callers, not the registry.
    pub fn export_wall_clock(&self) -> Vec<PersistedCooldown> {
        self.wall
            .read()
            .iter()
            .map(|(id, entry)| PersistedCooldown {
                id: id.clone(),
                started_at_millis: entry.started_at_millis,
                duration_millis: entry.duration_millis,
            })
            .collect()
    }

    /// Replace the wall-clock entries with restored snapshot records.
    pub fn restore_wall_clock(&self, records: Vec<PersistedCooldown>) {
        let mut wall = self.wall.write();
        wall.clear();
        for record in records {
            wall.insert(
                record.id,
                WallClockEntry {
                    started_at_millis: record.started_at_millis,
                    duration_millis: record.duration_millis,
                },
            );
        }
    }
}
