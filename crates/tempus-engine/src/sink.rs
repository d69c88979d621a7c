//! Host-side visual time sink.
//!
//! A standalone host has no renderer, so applied tick values go to the
//! log. The world list comes from configuration: every configured zone
//! becomes a normal-environment world.

use tracing::debug;

use tempus_worlds::{VisualTimeSink, WorldDescriptor};

/// A sink that logs applied tick values for a fixed world list.
#[derive(Debug, Default)]
pub struct LoggingVisualSink {
    worlds: Vec<WorldDescriptor>,
}

impl LoggingVisualSink {
    /// Create a sink hosting the named normal-environment worlds.
    pub fn new(world_names: impl IntoIterator<Item = String>) -> Self {
        Self {
            worlds: world_names
                .into_iter()
                .map(WorldDescriptor::normal)
                .collect(),
        }
    }
}

impl VisualTimeSink for LoggingVisualSink {
    fn worlds(&self) -> Vec<WorldDescriptor> {
        self.worlds.clone()
    }

    fn apply_time(&self, world: &str, ticks: u32) {
        debug!(world, ticks, "visual time applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempus_worlds::WorldEnvironment;

    #[test]
    fn configured_worlds_are_normal_environment() {
        let sink = LoggingVisualSink::new(vec![String::from("overworld"), String::from("mines")]);
        let worlds = sink.worlds();
        assert_eq!(worlds.len(), 2);
        assert!(worlds
            .iter()
            .all(|w| w.environment == WorldEnvironment::Normal));
    }
}
