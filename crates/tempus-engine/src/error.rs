//! Host-level error type.

use tempus_core::config::ConfigError;
use tempus_core::engine::EngineError;

/// Errors that can stop the clock host from running.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Configuration could not be loaded.
    #[error("configuration error: {source}")]
    Config {
        /// The underlying configuration error.
        #[from]
        source: ConfigError,
    },

    /// The clock engine failed to start or stop.
    #[error("clock engine error: {source}")]
    Engine {
        /// The underlying engine error.
        #[from]
        source: EngineError,
    },
}
