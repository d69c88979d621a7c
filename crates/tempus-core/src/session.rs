//! Per-entity connection and play-time bookkeeping.
//!
//! Tracks, for each connected entity, the wall-clock instant it joined,
//! its accumulated play time across sessions, and the server minute
//! counter at join -- so game logic can ask both "how long has this entity
//! played" and "how much simulated time has this entity lived through".
//! Reads dominate (HUD refreshes, command handlers), so each map sits
//! behind its own reader-favoring lock.
//!
//! Live-session state is folded into the accumulated total on disconnect
//! and on [`SessionRegistry::flush_all`] (the shutdown path).

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::calendar::{MINUTES_PER_DAY, MINUTES_PER_HOUR};
use crate::time_source::TimeSource;

/// Registry of per-entity session and play-time state.
#[derive(Debug)]
pub struct SessionRegistry {
    joined_at_millis: RwLock<HashMap<Uuid, i64>>,
    joined_at_minutes: RwLock<HashMap<Uuid, u64>>,
    accumulated_millis: RwLock<HashMap<Uuid, i64>>,
    time_source: Arc<dyn TimeSource>,
}

impl SessionRegistry {
    /// Create an empty registry reading "now" from the given source.
    pub fn new(time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            joined_at_millis: RwLock::new(HashMap::new()),
            joined_at_minutes: RwLock::new(HashMap::new()),
            accumulated_millis: RwLock::new(HashMap::new()),
            time_source,
        }
    }

    /// Record an entity connecting at the given server minute counter.
    ///
    /// Reconnecting without a disconnect restarts the live session; the
    /// accumulated total is untouched.
    pub fn connect(&self, entity: Uuid, server_minutes: u64) {
        self.joined_at_millis
            .write()
            .insert(entity, self.time_source.epoch_millis());
        self.joined_at_minutes.write().insert(entity, server_minutes);
        let _ = self.accumulated_millis.write().entry(entity).or_insert(0);
    }

    /// Record an entity disconnecting, folding the session into its total.
    pub fn disconnect(&self, entity: Uuid) {
        let _ = self.joined_at_minutes.write().remove(&entity);
        let joined_at = self.joined_at_millis.write().remove(&entity);
        if let Some(joined_at) = joined_at {
            let session = self
                .time_source
                .epoch_millis()
                .saturating_sub(joined_at);
            let mut totals = self.accumulated_millis.write();
            let total = totals.entry(entity).or_insert(0);
            *total = total.saturating_add(session);
        }
    }

    /// Seconds the entity's current session has lasted. Offline entities
    /// report 0.
    pub fn session_seconds(&self, entity: Uuid) -> u64 {
        self.joined_at_millis
            .read()
            .get(&entity)
            .map_or(0, |joined_at| {
                let elapsed = self
                    .time_source
                    .epoch_millis()
                    .saturating_sub(*joined_at);
                u64::try_from(elapsed / 1000).unwrap_or(0)
            })
    }

    /// Total play seconds: accumulated sessions plus the live one.
    pub fn total_seconds(&self, entity: Uuid) -> u64 {
        let accumulated = self
            .accumulated_millis
            .read()
            .get(&entity)
            .copied()
            .unwrap_or(0);
        let live = self
            .joined_at_millis
            .read()
            .get(&entity)
            .map_or(0, |joined_at| {
                self.time_source
                    .epoch_millis()
                    .saturating_sub(*joined_at)
            });
        u64::try_from(accumulated.saturating_add(live) / 1000).unwrap_or(0)
    }

    /// The simulated day this entity is living through, counted from its
    /// join (1-based). Offline or unknown entities report 0.
    pub fn experienced_day(&self, entity: Uuid, server_minutes: u64) -> u64 {
        self.joined_at_minutes
            .read()
            .get(&entity)
            .map_or(0, |joined| {
                server_minutes.saturating_sub(*joined) / MINUTES_PER_DAY + 1
            })
    }

    /// The hour of the entity's experienced time. Unknown entities fall
    /// back to the server's own hour.
    #[allow(clippy::cast_possible_truncation)]
    pub fn experienced_hour(&self, entity: Uuid, server_minutes: u64) -> u32 {
        let minutes = self
            .joined_at_minutes
            .read()
            .get(&entity)
            .map_or(server_minutes, |joined| {
                server_minutes.saturating_sub(*joined)
            });
        ((minutes % MINUTES_PER_DAY) / MINUTES_PER_HOUR) as u32
    }

    /// The minute of the entity's experienced time. Unknown entities fall
    /// back to the server's own minute.
    #[allow(clippy::cast_possible_truncation)]
    pub fn experienced_minute(&self, entity: Uuid, server_minutes: u64) -> u32 {
        let minutes = self
            .joined_at_minutes
            .read()
            .get(&entity)
            .map_or(server_minutes, |joined| {
                server_minutes.saturating_sub(*joined)
            });
        (minutes % MINUTES_PER_HOUR) as u32
    }

    /// The entity's experienced time as `"<day>일차 HH:MM"`.
    pub fn experienced_formatted(&self, entity: Uuid, server_minutes: u64) -> String {
        format!(
            "{}일차 {:02}:{:02}",
            self.experienced_day(entity, server_minutes),
            self.experienced_hour(entity, server_minutes),
            self.experienced_minute(entity, server_minutes)
        )
    }

    /// The server time at which the entity joined, formatted, if online.
    pub fn join_server_time(&self, entity: Uuid) -> Option<String> {
        self.joined_at_minutes
            .read()
            .get(&entity)
            .map(|joined| crate::calendar::format_time(*joined))
    }

    /// The entity's total play time as a compact duration string, e.g.
    /// `"2d 5h 30m 12s"`. Zero-valued leading parts are elided.
    pub fn formatted_play_time(&self, entity: Uuid) -> String {
        let total = self.total_seconds(entity);
        let days = total / 86_400;
        let hours = (total % 86_400) / 3_600;
        let minutes = (total % 3_600) / 60;
        let seconds = total % 60;

        let mut parts = Vec::new();
        if days > 0 {
            parts.push(format!("{days}d"));
        }
        if hours > 0 {
            parts.push(format!("{hours}h"));
        }
        if minutes > 0 {
            parts.push(format!("{minutes}m"));
        }
        if seconds > 0 || parts.is_empty() {
            parts.push(format!("{seconds}s"));
        }
        parts.join(" ")
    }

    /// Fold every live session into its accumulated total.
    ///
    /// Called on shutdown so no play time is lost for entities that never
    /// disconnect cleanly.
    pub fn flush_all(&self) {
        let entities: Vec<Uuid> = self.joined_at_millis.read().keys().copied().collect();
        for entity in entities {
            self.disconnect(entity);
        }
    }

    /// Number of entities currently connected.
    pub fn connected_len(&self) -> usize {
        self.joined_at_millis.read().len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::time_source::ManualTimeSource;

    fn registry_at(millis: i64) -> (Arc<ManualTimeSource>, SessionRegistry) {
        let source = Arc::new(ManualTimeSource::new(millis));
        let registry = SessionRegistry::new(Arc::clone(&source) as Arc<dyn TimeSource>);
        (source, registry)
    }

    #[test]
    fn session_time_tracks_the_wall_clock() {
        let (source, registry) = registry_at(0);
        let entity = Uuid::new_v4();

        registry.connect(entity, 100);
        assert_eq!(registry.session_seconds(entity), 0);

        source.advance_seconds(90);
        assert_eq!(registry.session_seconds(entity), 90);
        assert_eq!(registry.total_seconds(entity), 90);
    }

    #[test]
    fn disconnect_folds_into_the_total() {
        let (source, registry) = registry_at(0);
        let entity = Uuid::new_v4();

        registry.connect(entity, 0);
        source.advance_seconds(60);
        registry.disconnect(entity);

        assert_eq!(registry.session_seconds(entity), 0);
        assert_eq!(registry.total_seconds(entity), 60);

        // A second session adds on top.
        registry.connect(entity, 0);
        source.advance_seconds(30);
        assert_eq!(registry.total_seconds(entity), 90);
    }

    #[test]
    fn experienced_time_counts_from_join() {
        let (_, registry) = registry_at(0);
        let entity = Uuid::new_v4();

        // Joined at server minute 1000; server is now at 1000 + 1500.
        registry.connect(entity, 1_000);
        let now = 2_500;
        assert_eq!(registry.experienced_day(entity, now), 2);
        assert_eq!(registry.experienced_hour(entity, now), 1);
        assert_eq!(registry.experienced_minute(entity, now), 0);
        assert_eq!(registry.experienced_formatted(entity, now), "2일차 01:00");
        assert_eq!(registry.join_server_time(entity).unwrap(), "1일차 16:40");
    }

    #[test]
    fn unknown_entity_falls_back_to_server_fields() {
        let (_, registry) = registry_at(0);
        let ghost = Uuid::new_v4();

        assert_eq!(registry.experienced_day(ghost, 2_500), 0);
        assert_eq!(registry.experienced_hour(ghost, 2_500), 17);
        assert_eq!(registry.experienced_minute(ghost, 2_500), 40);
        assert!(registry.join_server_time(ghost).is_none());
    }

    #[test]
    fn play_time_formats_compactly() {
        let (source, registry) = registry_at(0);
        let entity = Uuid::new_v4();

        registry.connect(entity, 0);
        assert_eq!(registry.formatted_play_time(entity), "0s");

        // 1 day, 2 hours, 3 minutes, 4 seconds
        source.advance_seconds(86_400 + 7_200 + 180 + 4);
        assert_eq!(registry.formatted_play_time(entity), "1d 2h 3m 4s");
    }

    #[test]
    fn flush_folds_every_live_session() {
        let (source, registry) = registry_at(0);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        registry.connect(a, 0);
        registry.connect(b, 0);
        source.advance_seconds(10);
        registry.flush_all();

        assert_eq!(registry.connected_len(), 0);
        assert_eq!(registry.total_seconds(a), 10);
        assert_eq!(registry.total_seconds(b), 10);
    }
}
