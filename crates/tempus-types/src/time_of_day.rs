//! Time-of-day phase markers.
//!
//! A marker is anchored to a specific hour of the simulated day. The clock
//! engine fires a `TimeOfDayChanged` notification when a tick lands on a
//! marker hour that differs from the last fired marker, so game logic can
//! react to dawn, dusk, and friends without tracking hours itself.

use serde::{Deserialize, Serialize};

/// A named phase of the simulated day, anchored to a fixed hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDayMarker {
    /// Hour 0.
    Midnight,
    /// Hour 5.
    Dawn,
    /// Hour 6.
    Morning,
    /// Hour 12.
    Noon,
    /// Hour 18.
    Dusk,
    /// Hour 22.
    Night,
}

impl TimeOfDayMarker {
    /// Return the marker anchored to the given hour, if any.
    ///
    /// Only the six anchor hours map to a marker; every other hour
    /// returns `None`.
    pub const fn for_hour(hour: u32) -> Option<Self> {
        match hour {
            0 => Some(Self::Midnight),
            5 => Some(Self::Dawn),
            6 => Some(Self::Morning),
            12 => Some(Self::Noon),
            18 => Some(Self::Dusk),
            22 => Some(Self::Night),
            _ => None,
        }
    }

    /// Return the hour this marker is anchored to.
    pub const fn hour(self) -> u32 {
        match self {
            Self::Midnight => 0,
            Self::Dawn => 5,
            Self::Morning => 6,
            Self::Noon => 12,
            Self::Dusk => 18,
            Self::Night => 22,
        }
    }
}
