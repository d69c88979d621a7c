//! The clock engine: periodic tick, boundary diffing, and notification
//! emission.
//!
//! [`ClockEngine`] owns the canonical counter and drives it from a
//! background tokio task. The counter has exactly two mutation paths --
//! the tick increment and [`ClockEngine::set_time`] -- and both serialize
//! through one mutex so a speed change, a manual adjustment, and a tick
//! can never tear each other's state. The diff-and-emit step runs
//! entirely on the tick task: it is the single logical writer for every
//! externally visible effect of time advancement, including the
//! per-world visual refresh.
//!
//! Boundary notifications go out over one ordered broadcast channel in a
//! fixed order per tick: minute, hour, day, week, month, time-of-day --
//! each at most once. Persistence never runs on the tick path; snapshots
//! are cloned out under the lock and written by whoever asked (the
//! auto-save task or [`ClockEngine::stop`]).

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use tempus_store::{SnapshotStore, StoreError, TimeSnapshot};
use tempus_types::{ClockNotification, TimeOfDayMarker};
use tempus_worlds::{VisualTimeSink, WorldEnvironment, WorldTimeZones};

use crate::calendar::CalendarSnapshot;
use crate::clock::{ClockError, SimulatedClock};
use crate::config::ClockConfig;
use crate::controls::ClockControls;
use crate::cooldown::CooldownRegistry;

/// Capacity of the notification broadcast channel.
///
/// A subscriber that falls behind by more than this many notifications
/// receives a `Lagged` error and skips to the newest one.
const BROADCAST_CAPACITY: usize = 256;

/// Errors that can occur while operating the clock engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An accessor or control was called before `start()`.
    #[error("clock engine has not been started")]
    NotStarted,

    /// `start()` was called a second time.
    #[error("clock engine is already started")]
    AlreadyStarted,

    /// A clock validation or counter operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// A snapshot persistence operation failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },
}

/// The last calendar field values the diff step observed.
#[derive(Debug, Clone, Copy)]
struct LastSeen {
    hour: u32,
    day: u64,
    week: u64,
    month: u64,
    /// The last fired time-of-day marker. Deliberately not refreshed by
    /// `start()` or `set_time`: the first tick that lands on a marker
    /// hour after either fires once, matching the legacy behavior.
    marker: Option<TimeOfDayMarker>,
}

impl LastSeen {
    const fn at_epoch() -> Self {
        Self {
            hour: 0,
            day: 1,
            week: 1,
            month: 1,
            marker: None,
        }
    }

    /// Align the tracked fields with a snapshot, leaving the marker as-is.
    const fn refresh(&mut self, snap: &CalendarSnapshot) {
        self.hour = snap.hour;
        self.day = snap.day;
        self.week = snap.week;
        self.month = snap.month;
    }
}

/// The mutable clock state behind the engine's single mutation point.
#[derive(Debug)]
struct EngineState {
    clock: SimulatedClock,
    last: LastSeen,
}

/// The authoritative clock engine for one simulation.
///
/// Construct one per process with [`ClockEngine::new`], wrap it in an
/// [`Arc`], call [`ClockEngine::start`] once, and hand clones to every
/// consumer. There is no global instance.
#[derive(Debug)]
pub struct ClockEngine {
    state: Mutex<EngineState>,
    controls: ClockControls,
    cooldowns: Arc<CooldownRegistry>,
    zones: Arc<WorldTimeZones>,
    sink: Arc<dyn VisualTimeSink>,
    events: broadcast::Sender<ClockNotification>,
    store: SnapshotStore,
    tick_task: Mutex<Option<JoinHandle<()>>>,
    base_interval_ms: u64,
    /// Handle the engine uses to give the spawned tick loop an owned
    /// reference to itself.
    self_handle: Weak<Self>,
}

impl ClockEngine {
    /// Create an engine from its collaborators. The engine is always
    /// shared between the tick task and its callers, so construction
    /// hands back an [`Arc`] directly. It does not tick until
    /// [`ClockEngine::start`] is called.
    pub fn new(
        config: &ClockConfig,
        store: SnapshotStore,
        cooldowns: Arc<CooldownRegistry>,
        zones: Arc<WorldTimeZones>,
        sink: Arc<dyn VisualTimeSink>,
    ) -> Arc<Self> {
        let base_interval_ms = config.real_seconds_per_minute.max(1).saturating_mul(1000);
        let (events, _) = broadcast::channel(BROADCAST_CAPACITY);
        Arc::new_cyclic(|self_handle| Self {
            state: Mutex::new(EngineState {
                clock: SimulatedClock::new(),
                last: LastSeen::at_epoch(),
            }),
            controls: ClockControls::new(base_interval_ms),
            cooldowns,
            zones,
            sink,
            events,
            store,
            tick_task: Mutex::new(None),
            base_interval_ms,
            self_handle: self_handle.clone(),
        })
    }

    /// Subscribe to boundary notifications.
    ///
    /// Subscribing before `start()` is allowed and guarantees no tick is
    /// missed.
    pub fn subscribe(&self) -> broadcast::Receiver<ClockNotification> {
        self.events.subscribe()
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Load persisted state, initialize the diff baseline, and begin
    /// ticking on a background task.
    ///
    /// A missing or corrupt snapshot resets the counter to zero and is
    /// never fatal. No boundary notifications fire for the restored
    /// position itself.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::AlreadyStarted`] on a second call.
    pub async fn start(&self) -> Result<(), EngineError> {
        if self.controls.is_started() {
            return Err(EngineError::AlreadyStarted);
        }

        let snapshot = self.store.load_or_default().await;
        self.cooldowns.restore_wall_clock(snapshot.cooldowns);

        let formatted = {
            let mut state = self.state.lock();
            state.clock = SimulatedClock::from_total_minutes(snapshot.total_minutes);
            let snap = state.clock.snapshot();
            state.last.refresh(&snap);
            state.clock.formatted_time()
        };

        self.controls.mark_started();

        if let Some(engine) = self.self_handle.upgrade() {
            let handle = tokio::spawn(engine.run_tick_loop());
            *self.tick_task.lock() = Some(handle);
        }

        info!(time = %formatted, "clock engine started");
        Ok(())
    }

    /// Halt the tick loop and flush the snapshot.
    ///
    /// A tick already in flight completes its full event cascade before
    /// the loop exits.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotStarted`] before `start()`, or a store
    /// error if the final flush fails.
    pub async fn stop(&self) -> Result<(), EngineError> {
        self.ensure_started()?;
        self.controls.request_stop();

        let handle = self.tick_task.lock().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "tick loop task did not exit cleanly");
            }
        }

        self.save().await?;
        info!("clock engine stopped");
        Ok(())
    }

    /// Flush the current snapshot to the store.
    ///
    /// Used by the auto-save task; the state is cloned out under the lock
    /// so the write itself never blocks the tick path.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotStarted`] before `start()`, or the
    /// underlying store error.
    pub async fn save(&self) -> Result<(), EngineError> {
        self.ensure_started()?;
        let snapshot = TimeSnapshot {
            total_minutes: self.state.lock().clock.total_minutes(),
            cooldowns: self.cooldowns.export_wall_clock(),
        };
        self.store.save(&snapshot).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Time control
    // -----------------------------------------------------------------------

    /// Jump the clock to an explicit day/hour/minute.
    ///
    /// Validation happens before any mutation. On success the diff
    /// baseline is refreshed (no retroactive boundary notifications), a
    /// single [`ClockNotification::TimeManuallySet`] is emitted, and
    /// every world's visual time is refreshed.
    ///
    /// # Errors
    ///
    /// Returns the matching validation error for a day below 1, an hour
    /// outside 0-23, or a minute outside 0-59; the clock is unchanged.
    pub fn set_time(&self, day: u64, hour: u32, minute: u32) -> Result<(), EngineError> {
        self.ensure_started()?;

        let (old_total, new_total) = {
            let mut state = self.state.lock();
            let old_total = state.clock.total_minutes();
            let new_total = state.clock.set_time(day, hour, minute)?;
            let snap = state.clock.snapshot();
            state.last.refresh(&snap);
            (old_total, new_total)
        };

        let _ = self.events.send(ClockNotification::TimeManuallySet {
            old_total,
            new_total,
            day,
            hour,
            minute,
        });
        self.refresh_visual_time();

        info!(old_total, new_total, day, hour, minute, "time manually set");
        Ok(())
    }

    /// Change the speed multiplier and retime the tick loop.
    ///
    /// Already-elapsed simulated time is never altered -- only the cadence
    /// of future ticks changes. The loop picks up the new interval
    /// immediately, even mid-sleep.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `speed` is not a positive, finite
    /// number; the previous speed and interval stay in effect.
    pub fn set_time_speed(&self, speed: f64) -> Result<(), EngineError> {
        self.ensure_started()?;
        if !speed.is_finite() || speed <= 0.0 {
            return Err(EngineError::Clock {
                source: ClockError::InvalidSpeed { speed },
            });
        }

        self.controls.set_speed(speed);
        let interval_ms = scaled_interval_ms(self.base_interval_ms, speed);
        self.controls.set_interval_ms(interval_ms);

        info!(speed, interval_ms, "time speed changed");
        Ok(())
    }

    /// The current speed multiplier.
    pub fn time_speed(&self) -> Result<f64, EngineError> {
        self.ensure_started()?;
        Ok(self.controls.speed())
    }

    /// Freeze the counter by halting future ticks.
    pub fn pause_time(&self) -> Result<(), EngineError> {
        self.ensure_started()?;
        self.controls.pause();
        info!("time paused");
        Ok(())
    }

    /// Resume ticking after a pause.
    pub fn resume_time(&self) -> Result<(), EngineError> {
        self.ensure_started()?;
        self.controls.resume();
        info!("time resumed");
        Ok(())
    }

    /// Whether the tick loop is paused.
    pub fn is_time_paused(&self) -> Result<bool, EngineError> {
        self.ensure_started()?;
        Ok(self.controls.is_paused())
    }

    // -----------------------------------------------------------------------
    // Query surface
    // -----------------------------------------------------------------------

    /// Total simulated minutes since the clock epoch.
    pub fn total_minutes(&self) -> Result<u64, EngineError> {
        self.ensure_started()?;
        Ok(self.state.lock().clock.total_minutes())
    }

    /// The full calendar snapshot for the current counter.
    pub fn calendar_snapshot(&self) -> Result<CalendarSnapshot, EngineError> {
        self.ensure_started()?;
        Ok(self.state.lock().clock.snapshot())
    }

    /// Current day (1-based).
    pub fn day(&self) -> Result<u64, EngineError> {
        Ok(self.calendar_snapshot()?.day)
    }

    /// Current hour (0-23).
    pub fn hour(&self) -> Result<u32, EngineError> {
        Ok(self.calendar_snapshot()?.hour)
    }

    /// Current minute (0-59).
    pub fn minute(&self) -> Result<u32, EngineError> {
        Ok(self.calendar_snapshot()?.minute)
    }

    /// Current week (1-based).
    pub fn week(&self) -> Result<u64, EngineError> {
        Ok(self.calendar_snapshot()?.week)
    }

    /// Current month (1-based).
    pub fn month(&self) -> Result<u64, EngineError> {
        Ok(self.calendar_snapshot()?.month)
    }

    /// Current year (1-based).
    pub fn year(&self) -> Result<u64, EngineError> {
        Ok(self.calendar_snapshot()?.year)
    }

    /// Current time as `"<day>일차 HH:MM"`.
    pub fn formatted_time(&self) -> Result<String, EngineError> {
        self.ensure_started()?;
        Ok(self.state.lock().clock.formatted_time())
    }

    // -----------------------------------------------------------------------
    // Cooldown facade
    // -----------------------------------------------------------------------

    /// Arm a wall-clock cooldown for `duration_seconds`.
    pub fn set_cooldown(&self, id: &str, duration_seconds: u64) -> Result<(), EngineError> {
        self.ensure_started()?;
        self.cooldowns.set(id, duration_seconds);
        Ok(())
    }

    /// Whether a wall-clock cooldown has expired. Unknown ids are expired.
    pub fn is_cooldown_over(&self, id: &str) -> Result<bool, EngineError> {
        self.ensure_started()?;
        Ok(self.cooldowns.is_over(id))
    }

    /// Remaining wall-clock seconds, floored at 0.
    pub fn remaining_cooldown_seconds(&self, id: &str) -> Result<u64, EngineError> {
        self.ensure_started()?;
        Ok(self.cooldowns.remaining_seconds(id))
    }

    /// Delete a cooldown from both time bases. Idempotent.
    pub fn remove_cooldown(&self, id: &str) -> Result<(), EngineError> {
        self.ensure_started()?;
        self.cooldowns.remove(id);
        Ok(())
    }

    /// Arm a simulated-minute cooldown at the current counter.
    pub fn set_simulated_cooldown(&self, id: &str) -> Result<(), EngineError> {
        let now_minutes = self.total_minutes()?;
        self.cooldowns.set_simulated(id, now_minutes);
        Ok(())
    }

    /// Whether a simulated cooldown of the caller-supplied duration has
    /// expired. Unknown ids are expired.
    pub fn is_simulated_cooldown_over(
        &self,
        id: &str,
        duration_minutes: u64,
    ) -> Result<bool, EngineError> {
        let now_minutes = self.total_minutes()?;
        Ok(self
            .cooldowns
            .is_simulated_over(id, duration_minutes, now_minutes))
    }

    /// Remaining simulated minutes, floored at 0.
    pub fn remaining_simulated_cooldown_minutes(
        &self,
        id: &str,
        duration_minutes: u64,
    ) -> Result<u64, EngineError> {
        let now_minutes = self.total_minutes()?;
        Ok(self
            .cooldowns
            .remaining_simulated_minutes(id, duration_minutes, now_minutes))
    }

    // -----------------------------------------------------------------------
    // Tick internals
    // -----------------------------------------------------------------------

    fn ensure_started(&self) -> Result<(), EngineError> {
        if self.controls.is_started() {
            Ok(())
        } else {
            Err(EngineError::NotStarted)
        }
    }

    /// The background tick loop.
    ///
    /// Sleeps one interval, advances one minute, repeats. The interval is
    /// re-read every iteration so speed changes apply without restarting
    /// the task; a reconfigure wakeup aborts a sleep already in flight.
    async fn run_tick_loop(self: Arc<Self>) {
        debug!("tick loop running");
        loop {
            self.controls.wait_if_paused().await;
            if self.controls.is_stop_requested() {
                break;
            }

            let interval = Duration::from_millis(self.controls.interval_ms());
            tokio::select! {
                () = tokio::time::sleep(interval) => self.advance_one_minute(),
                () = self.controls.reconfigured() => {}
            }
        }
        debug!("tick loop stopped");
    }

    /// Advance the counter by one minute and emit boundary notifications.
    fn advance_one_minute(&self) {
        let notifications = {
            let mut state = self.state.lock();
            if let Err(err) = state.clock.advance() {
                warn!(error = %err, "tick skipped");
                return;
            }
            let snap = state.clock.snapshot();
            collect_boundary_events(&mut state.last, &snap)
        };

        for notification in notifications {
            let _ = self.events.send(notification);
        }
        self.refresh_visual_time();
    }

    /// Push the renderable tick value into every normal-environment world.
    fn refresh_visual_time(&self) {
        let server_total = self.state.lock().clock.total_minutes();
        for world in self.sink.worlds() {
            if world.environment != WorldEnvironment::Normal {
                continue;
            }
            let ticks = self.zones.visual_ticks(&world.name, server_total);
            self.sink.apply_time(&world.name, ticks);
        }
    }
}

/// Diff a fresh snapshot against the last observed fields and produce the
/// tick's notifications in emission order.
fn collect_boundary_events(
    last: &mut LastSeen,
    snap: &CalendarSnapshot,
) -> Vec<ClockNotification> {
    let mut out = vec![ClockNotification::MinuteChanged {
        total_minutes: snap.total_minutes,
    }];

    if snap.hour != last.hour {
        last.hour = snap.hour;
        out.push(ClockNotification::HourChanged {
            hour: snap.hour,
            day: snap.day,
        });
    }

    if snap.day != last.day {
        last.day = snap.day;
        out.push(ClockNotification::DayChanged { day: snap.day });

        // Weeks only roll on their first day.
        if snap.day_of_week == 1 && snap.week != last.week {
            last.week = snap.week;
            out.push(ClockNotification::WeekChanged {
                week: snap.week,
                first_day: snap.day,
            });
        }

        if snap.month != last.month {
            last.month = snap.month;
            out.push(ClockNotification::MonthChanged {
                month: snap.month,
                year: snap.year,
            });
        }
    }

    if let Some(marker) = TimeOfDayMarker::for_hour(snap.hour) {
        if last.marker != Some(marker) {
            last.marker = Some(marker);
            out.push(ClockNotification::TimeOfDayChanged {
                marker,
                day: snap.day,
            });
        }
    }

    out
}

/// The tick interval for a base cadence and speed multiplier, in
/// milliseconds, floored at 1.
///
/// The float division is the defined scaling rule, so the lossy casts
/// are intentional here.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn scaled_interval_ms(base_ms: u64, speed: f64) -> u64 {
    ((base_ms as f64 / speed).round() as u64).max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tempus_store::SnapshotStore;
    use tempus_worlds::{NullVisualSink, WorldDescriptor, WorldTimeZones};

    use super::*;
    use crate::config::ClockConfig;
    use crate::time_source::{ManualTimeSource, TimeSource};

    /// A sink recording every applied tick value, for assertions.
    #[derive(Debug, Default)]
    struct RecordingSink {
        worlds: Vec<WorldDescriptor>,
        applied: Mutex<Vec<(String, u32)>>,
    }

    impl VisualTimeSink for RecordingSink {
        fn worlds(&self) -> Vec<WorldDescriptor> {
            self.worlds.clone()
        }

        fn apply_time(&self, world: &str, ticks: u32) {
            self.applied.lock().push((world.to_owned(), ticks));
        }
    }

    fn test_config() -> ClockConfig {
        ClockConfig {
            real_seconds_per_minute: 17,
            ..ClockConfig::default()
        }
    }

    fn make_engine(dir: &tempfile::TempDir) -> Arc<ClockEngine> {
        make_engine_with_sink(dir, Arc::new(NullVisualSink))
    }

    fn make_engine_with_sink(
        dir: &tempfile::TempDir,
        sink: Arc<dyn VisualTimeSink>,
    ) -> Arc<ClockEngine> {
        let source = Arc::new(ManualTimeSource::new(0)) as Arc<dyn TimeSource>;
        ClockEngine::new(
            &test_config(),
            SnapshotStore::new(dir.path().join("timedata.dat")),
            Arc::new(CooldownRegistry::new(source)),
            Arc::new(WorldTimeZones::new()),
            sink,
        )
    }

    #[tokio::test]
    async fn accessors_fail_before_start() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);

        assert!(matches!(engine.total_minutes(), Err(EngineError::NotStarted)));
        assert!(matches!(engine.day(), Err(EngineError::NotStarted)));
        assert!(matches!(engine.formatted_time(), Err(EngineError::NotStarted)));
        assert!(matches!(engine.time_speed(), Err(EngineError::NotStarted)));
        assert!(matches!(
            engine.set_time(1, 0, 0),
            Err(EngineError::NotStarted)
        ));
        assert!(matches!(
            engine.is_cooldown_over("x"),
            Err(EngineError::NotStarted)
        ));
    }

    #[tokio::test]
    async fn start_twice_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();
        assert!(matches!(
            engine.start().await,
            Err(EngineError::AlreadyStarted)
        ));
        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn fresh_engine_starts_at_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        assert_eq!(engine.total_minutes().unwrap(), 0);
        assert_eq!(engine.day().unwrap(), 1);
        assert_eq!(engine.hour().unwrap(), 0);
        assert_eq!(engine.minute().unwrap(), 0);
        assert_eq!(engine.week().unwrap(), 1);
        assert_eq!(engine.month().unwrap(), 1);
        assert_eq!(engine.year().unwrap(), 1);
        assert_eq!(engine.formatted_time().unwrap(), "1일차 00:00");
        assert!(!engine.is_time_paused().unwrap());

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn set_time_round_trips_and_notifies() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        let mut events = engine.subscribe();
        engine.set_time(3, 15, 30).unwrap();

        assert_eq!(engine.day().unwrap(), 3);
        assert_eq!(engine.hour().unwrap(), 15);
        assert_eq!(engine.minute().unwrap(), 30);
        assert_eq!(engine.formatted_time().unwrap(), "3일차 15:30");

        // Exactly one notification: the manual set. No boundary events
        // fire retroactively.
        assert_eq!(
            events.try_recv().unwrap(),
            ClockNotification::TimeManuallySet {
                old_total: 0,
                new_total: 2 * 1440 + 15 * 60 + 30,
                day: 3,
                hour: 15,
                minute: 30,
            }
        );
        assert!(events.try_recv().is_err());

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_set_time_leaves_state_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();
        engine.set_time(2, 8, 0).unwrap();

        let mut events = engine.subscribe();
        assert!(engine.set_time(0, 8, 0).is_err());
        assert!(engine.set_time(2, 24, 0).is_err());
        assert!(engine.set_time(2, 8, 60).is_err());

        assert_eq!(engine.total_minutes().unwrap(), 1440 + 8 * 60);
        assert!(events.try_recv().is_err());

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn day_rollover_fires_minute_hour_day_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();
        engine.set_time(1, 23, 59).unwrap();

        let mut events = engine.subscribe();
        engine.advance_one_minute();

        assert_eq!(
            events.try_recv().unwrap(),
            ClockNotification::MinuteChanged {
                total_minutes: 1440
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            ClockNotification::HourChanged { hour: 0, day: 2 }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            ClockNotification::DayChanged { day: 2 }
        );
        // Hour 0 is the midnight marker and none has fired yet this run.
        assert_eq!(
            events.try_recv().unwrap(),
            ClockNotification::TimeOfDayChanged {
                marker: TimeOfDayMarker::Midnight,
                day: 2
            }
        );
        // Day 2 is not the first day of a week, and month 1 is unchanged.
        assert!(events.try_recv().is_err());

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn week_and_month_fire_on_their_boundaries() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        // Day 7 -> day 8: a new week opens (day_of_week == 1).
        engine.set_time(7, 23, 59).unwrap();
        let mut events = engine.subscribe();
        engine.advance_one_minute();

        let kinds: Vec<ClockNotification> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(kinds.contains(&ClockNotification::WeekChanged {
            week: 2,
            first_day: 8
        }));
        assert!(!kinds
            .iter()
            .any(|n| matches!(n, ClockNotification::MonthChanged { .. })));

        // Day 30 -> day 31: a new month, but not a new week.
        engine.set_time(30, 23, 59).unwrap();
        let mut events = engine.subscribe();
        engine.advance_one_minute();

        let kinds: Vec<ClockNotification> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(kinds.contains(&ClockNotification::MonthChanged { month: 2, year: 1 }));
        assert!(!kinds
            .iter()
            .any(|n| matches!(n, ClockNotification::WeekChanged { .. })));

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn plain_minute_fires_only_minute_changed() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();
        engine.set_time(1, 8, 30).unwrap();

        let mut events = engine.subscribe();
        engine.advance_one_minute();

        assert_eq!(
            events.try_recv().unwrap(),
            ClockNotification::MinuteChanged {
                total_minutes: 8 * 60 + 31
            }
        );
        assert!(events.try_recv().is_err());

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn marker_fires_once_per_marker_hour() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        // Tick into 05:00: dawn fires.
        engine.set_time(1, 4, 59).unwrap();
        let mut events = engine.subscribe();
        engine.advance_one_minute();
        let kinds: Vec<ClockNotification> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(kinds.contains(&ClockNotification::TimeOfDayChanged {
            marker: TimeOfDayMarker::Dawn,
            day: 1
        }));

        // The next minute is still dawn hour: no second marker event.
        let mut events = engine.subscribe();
        engine.advance_one_minute();
        let kinds: Vec<ClockNotification> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(!kinds
            .iter()
            .any(|n| matches!(n, ClockNotification::TimeOfDayChanged { .. })));

        engine.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn tick_loop_advances_on_the_configured_cadence() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        // Base cadence: 17s per simulated minute.
        tokio::time::sleep(Duration::from_millis(17_250 * 2)).await;
        assert_eq!(engine.total_minutes().unwrap(), 2);

        engine.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn pause_freezes_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(17_250)).await;
        assert_eq!(engine.total_minutes().unwrap(), 1);

        engine.pause_time().unwrap();
        assert!(engine.is_time_paused().unwrap());
        tokio::time::sleep(Duration::from_millis(170_000)).await;
        assert_eq!(engine.total_minutes().unwrap(), 1);

        engine.resume_time().unwrap();
        tokio::time::sleep(Duration::from_millis(17_250)).await;
        assert_eq!(engine.total_minutes().unwrap(), 2);

        engine.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_retimes_without_touching_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        tokio::time::sleep(Duration::from_millis(17_250)).await;
        assert_eq!(engine.total_minutes().unwrap(), 1);

        engine.set_time_speed(2.0).unwrap();
        assert_eq!(engine.total_minutes().unwrap(), 1);
        assert!((engine.time_speed().unwrap() - 2.0).abs() < f64::EPSILON);

        // At 2x the interval is 8.5s.
        tokio::time::sleep(Duration::from_millis(8_750)).await;
        assert_eq!(engine.total_minutes().unwrap(), 2);

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn invalid_speed_is_rejected_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();

        assert!(engine.set_time_speed(0.0).is_err());
        assert!(engine.set_time_speed(-2.0).is_err());
        assert!(engine.set_time_speed(f64::NAN).is_err());
        assert!((engine.time_speed().unwrap() - 1.0).abs() < f64::EPSILON);

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn state_round_trips_through_stop_and_start() {
        let dir = tempfile::tempdir().unwrap();

        let engine = make_engine(&dir);
        engine.start().await.unwrap();
        engine.set_time(5, 12, 0).unwrap();
        engine.set_cooldown("daily_reward", 86_400).unwrap();
        engine.stop().await.unwrap();

        let restored = make_engine(&dir);
        let mut events = restored.subscribe();
        restored.start().await.unwrap();
        assert_eq!(restored.total_minutes().unwrap(), 4 * 1440 + 12 * 60);
        assert_eq!(restored.formatted_time().unwrap(), "5일차 12:00");
        assert!(!restored.is_cooldown_over("daily_reward").unwrap());
        // Restoring the counter fires no boundary events of its own.
        assert!(events.try_recv().is_err());
        restored.stop().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_snapshot_recovers_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("timedata.dat"), b"garbage")
            .await
            .unwrap();

        let engine = make_engine(&dir);
        engine.start().await.unwrap();
        assert_eq!(engine.total_minutes().unwrap(), 0);
        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn simulated_cooldowns_follow_the_counter() {
        let dir = tempfile::tempdir().unwrap();
        let engine = make_engine(&dir);
        engine.start().await.unwrap();
        engine.set_time(1, 0, 0).unwrap();

        engine.set_simulated_cooldown("harvest").unwrap();
        assert!(!engine.is_simulated_cooldown_over("harvest", 30).unwrap());
        assert_eq!(
            engine
                .remaining_simulated_cooldown_minutes("harvest", 30)
                .unwrap(),
            30
        );

        engine.set_time(1, 0, 30).unwrap();
        assert!(engine.is_simulated_cooldown_over("harvest", 30).unwrap());

        engine.remove_cooldown("harvest").unwrap();
        assert!(engine.is_simulated_cooldown_over("harvest", 1_000).unwrap());

        engine.stop().await.unwrap();
    }

    #[tokio::test]
    async fn visual_refresh_skips_non_normal_worlds() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(RecordingSink {
            worlds: vec![
                WorldDescriptor::normal("overworld"),
                WorldDescriptor {
                    name: String::from("caverns"),
                    environment: WorldEnvironment::Other,
                },
            ],
            applied: Mutex::new(Vec::new()),
        });
        let engine = make_engine_with_sink(&dir, Arc::clone(&sink) as Arc<dyn VisualTimeSink>);
        engine.start().await.unwrap();

        sink.applied.lock().clear();
        // Noon on day 1: 720 minutes -> tick 12000.
        engine.set_time(1, 12, 0).unwrap();

        let applied = sink.applied.lock().clone();
        assert_eq!(applied, vec![(String::from("overworld"), 12_000)]);

        engine.stop().await.unwrap();
    }
}
