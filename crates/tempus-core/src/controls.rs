//! Shared control state for the tick loop.
//!
//! The tick loop and the public engine API run on different tasks, so all
//! mutable control fields are atomics: lock-free reads on the loop's hot
//! path, no lock shared with the engine's mutation mutex. Two [`Notify`]
//! handles wake the loop -- one for resume-after-pause, one for "interval
//! or lifecycle changed, re-evaluate now". The loop is the only waiter, so
//! `notify_one` is used throughout: its stored permit means a wakeup sent
//! between the loop's state check and its await is never lost.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;

/// Shared atomic control state for the clock engine's tick loop.
#[derive(Debug)]
pub struct ClockControls {
    /// Whether the engine has completed `start()`.
    started: AtomicBool,

    /// Whether the tick loop is paused.
    paused: AtomicBool,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Current tick interval in milliseconds.
    interval_ms: AtomicU64,

    /// Current speed multiplier, stored as `f64` bits.
    speed_bits: AtomicU64,

    /// Wakes the loop when the pause is lifted.
    resume_notify: Notify,

    /// Wakes the loop when the interval or lifecycle changed.
    reconfigure_notify: Notify,
}

impl ClockControls {
    /// Create controls with the given initial interval and speed 1.0.
    pub fn new(interval_ms: u64) -> Self {
        Self {
            started: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            interval_ms: AtomicU64::new(interval_ms),
            speed_bits: AtomicU64::new(1.0_f64.to_bits()),
            resume_notify: Notify::new(),
            reconfigure_notify: Notify::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Mark the engine as started.
    pub fn mark_started(&self) {
        self.started.store(true, Ordering::Release);
    }

    /// Whether the engine has completed `start()`.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Request a clean stop and wake the loop wherever it waits.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
        self.resume_notify.notify_one();
        self.reconfigure_notify.notify_one();
    }

    /// Whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Pause the tick loop. A tick already in progress completes its full
    /// event cascade before the pause takes effect.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        self.reconfigure_notify.notify_one();
    }

    /// Lift the pause and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Whether the tick loop is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Park until the pause is lifted or a stop is requested.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) && !self.is_stop_requested() {
            self.resume_notify.notified().await;
        }
    }

    // -----------------------------------------------------------------------
    // Tick cadence
    // -----------------------------------------------------------------------

    /// Current tick interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::Acquire)
    }

    /// Store a new tick interval and wake the loop so a sleep already in
    /// flight restarts with the new cadence.
    pub fn set_interval_ms(&self, ms: u64) {
        self.interval_ms.store(ms.max(1), Ordering::Release);
        self.reconfigure_notify.notify_one();
    }

    /// Current speed multiplier.
    pub fn speed(&self) -> f64 {
        f64::from_bits(self.speed_bits.load(Ordering::Acquire))
    }

    /// Store a new speed multiplier. Validation is the engine's job.
    pub fn set_speed(&self, speed: f64) {
        self.speed_bits.store(speed.to_bits(), Ordering::Release);
    }

    /// Wait until the interval or lifecycle changes.
    pub async fn reconfigured(&self) {
        self.reconfigure_notify.notified().await;
    }
}
