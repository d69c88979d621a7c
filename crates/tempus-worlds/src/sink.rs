//! The visual-time boundary between the clock and the host.
//!
//! The engine does not know what a "world" is beyond its name and
//! environment; the host owns the world list and applies renderable tick
//! values however its renderer expects. Only normal-environment worlds
//! run the day/night visual cycle.

/// The lighting environment a world renders under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEnvironment {
    /// A surface world with a day/night cycle.
    Normal,
    /// Any environment without a day/night cycle (interiors, voids).
    Other,
}

/// A world as the host describes it to the clock engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorldDescriptor {
    /// The world's unique name.
    pub name: String,
    /// The world's lighting environment.
    pub environment: WorldEnvironment,
}

impl WorldDescriptor {
    /// Describe a normal-environment world.
    pub fn normal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            environment: WorldEnvironment::Normal,
        }
    }
}

/// Receiver for per-world renderable time updates.
///
/// Implementations enumerate their worlds and accept a tick value in
/// `[0, 24000)` after every clock tick and every manual time change.
pub trait VisualTimeSink: Send + Sync + std::fmt::Debug {
    /// The worlds the host currently runs.
    fn worlds(&self) -> Vec<WorldDescriptor>;

    /// Apply a renderable tick value to the named world.
    fn apply_time(&self, world: &str, ticks: u32);
}

/// A sink with no worlds, for hosts and tests that do not render.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullVisualSink;

impl VisualTimeSink for NullVisualSink {
    fn worlds(&self) -> Vec<WorldDescriptor> {
        Vec::new()
    }

    fn apply_time(&self, _world: &str, _ticks: u32) {}
}
