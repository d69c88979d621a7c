//! Clock host binary for the Tempus virtual clock.
//!
//! Wires the clock engine to its collaborators and runs it until the
//! process is interrupted. It loads configuration, applies configured
//! world timezones, starts the tick loop, logs every boundary
//! notification, auto-saves on an interval, and flushes state on
//! shutdown.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `tempus-config.yaml` (or `TEMPUS_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Build the store, registries, zone table, and visual sink
//! 4. Apply configured world timezones
//! 5. Subscribe the notification logger
//! 6. Start the clock engine (restores persisted time)
//! 7. Apply the configured default speed and fixed start time
//! 8. Spawn the auto-save task
//! 9. Wait for ctrl-c, then stop the engine (final flush)

mod error;
mod sink;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tempus_core::config::{TempusConfig, WorldsConfig};
use tempus_core::cooldown::CooldownRegistry;
use tempus_core::engine::ClockEngine;
use tempus_core::time_source::{SystemTimeSource, TimeSource};
use tempus_store::SnapshotStore;
use tempus_types::ClockNotification;
use tempus_worlds::{WorldTimeZones, ZonePreset};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::HostError;
use crate::sink::LoggingVisualSink;

/// Application entry point for the clock host.
///
/// # Errors
///
/// Returns an error if configuration loading or an engine lifecycle step
/// fails.
#[tokio::main]
async fn main() -> Result<(), HostError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone())),
        )
        .with_target(true)
        .init();

    info!("tempus-engine starting");

    if !config.clock.enabled {
        info!("clock is disabled in configuration, exiting");
        return Ok(());
    }

    // 3. Build the engine and its collaborators.
    let time_source = Arc::new(SystemTimeSource) as Arc<dyn TimeSource>;
    let cooldowns = Arc::new(CooldownRegistry::new(Arc::clone(&time_source)));
    let zones = Arc::new(WorldTimeZones::new());
    let sink = Arc::new(LoggingVisualSink::new(
        config.worlds.zones.keys().cloned().collect::<Vec<_>>(),
    ));
    let store = SnapshotStore::new(config.data.file.clone());
    let engine = ClockEngine::new(
        &config.clock,
        store,
        cooldowns,
        Arc::clone(&zones),
        sink,
    );

    // 4. Apply configured world timezones.
    apply_world_zones(&config.worlds, &zones);

    // 5. Subscribe the notification logger before the first tick.
    let notifications = engine.subscribe();
    let _logger = tokio::spawn(log_notifications(notifications));

    // 6. Start the engine: restores persisted time and begins ticking.
    engine.start().await?;

    // 7. Apply the configured default speed and fixed start time.
    if (config.clock.default_speed - 1.0).abs() > f64::EPSILON {
        match engine.set_time_speed(config.clock.default_speed) {
            Ok(()) => info!(speed = config.clock.default_speed, "default time speed applied"),
            Err(err) => warn!(error = %err, "default time speed rejected"),
        }
    }
    if let Some(start) = config.clock.start_time {
        match engine.set_time(start.day, start.hour, start.minute) {
            Ok(()) => info!(day = start.day, hour = start.hour, minute = start.minute, "start time applied"),
            Err(err) => warn!(error = %err, "configured start time rejected"),
        }
    }

    // 8. Auto-save on the configured interval.
    let auto_save_minutes = config.data.auto_save_interval_minutes;
    if auto_save_minutes > 0 {
        let saver = Arc::clone(&engine);
        let _auto_save = tokio::spawn(async move {
            let period = Duration::from_secs(auto_save_minutes.saturating_mul(60));
            loop {
                tokio::time::sleep(period).await;
                match saver.save().await {
                    Ok(()) => debug!("auto-save complete"),
                    Err(err) => warn!(error = %err, "auto-save failed"),
                }
            }
        });
        info!(interval_minutes = auto_save_minutes, "auto-save scheduled");
    }

    let time = engine.formatted_time()?;
    info!(%time, "tempus-engine running, ctrl-c to stop");

    // 9. Run until interrupted, then flush and exit.
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "signal listener failed, shutting down");
    }
    engine.stop().await?;
    info!("tempus-engine stopped");
    Ok(())
}

/// Load configuration from `TEMPUS_CONFIG` or `tempus-config.yaml`.
///
/// A missing file yields the default configuration; a present but
/// malformed file is an error.
fn load_config() -> Result<TempusConfig, HostError> {
    let path = std::env::var("TEMPUS_CONFIG")
        .map_or_else(|_| PathBuf::from("tempus-config.yaml"), PathBuf::from);
    if path.exists() {
        Ok(TempusConfig::from_file(&path)?)
    } else {
        Ok(TempusConfig::default())
    }
}

/// Apply every configured world zone to the zone table.
fn apply_world_zones(config: &WorldsConfig, zones: &WorldTimeZones) {
    if !config.timezone_enabled {
        return;
    }

    for (world, entry) in &config.zones {
        if let Some(name) = &entry.preset {
            match ZonePreset::from_name(name) {
                Some(preset) => {
                    zones.apply_preset(world, preset);
                    info!(%world, preset = name.as_str(), "timezone preset applied");
                }
                None => warn!(%world, preset = name.as_str(), "unknown timezone preset, skipped"),
            }
        } else {
            zones.set_offset(world, entry.offset);
            if let Err(err) = zones.set_speed(world, entry.speed) {
                warn!(%world, error = %err, "invalid zone speed, keeping the default");
            }
            info!(
                %world,
                offset = entry.offset,
                speed = entry.speed,
                "custom timezone applied"
            );
        }
    }
}

/// Log boundary notifications until the engine drops the channel.
async fn log_notifications(mut notifications: broadcast::Receiver<ClockNotification>) {
    loop {
        match notifications.recv().await {
            Ok(ClockNotification::MinuteChanged { total_minutes }) => {
                debug!(total_minutes, "minute");
            }
            Ok(ClockNotification::HourChanged { hour, day }) => info!(hour, day, "hour changed"),
            Ok(ClockNotification::DayChanged { day }) => info!(day, "day changed"),
            Ok(ClockNotification::WeekChanged { week, first_day }) => {
                info!(week, first_day, "week changed");
            }
            Ok(ClockNotification::MonthChanged { month, year }) => {
                info!(month, year, "month changed");
            }
            Ok(ClockNotification::TimeOfDayChanged { marker, day }) => {
                info!(?marker, day, "time of day changed");
            }
            Ok(ClockNotification::TimeManuallySet {
                old_total,
                new_total,
                ..
            }) => info!(old_total, new_total, "time manually set"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "notification log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
