//! Named timezone presets and override rules.
//!
//! A preset bundles a static offset with an optional override rule. The
//! override set is closed and dispatched by explicit matching: a zone
//! either follows the plain offset, pins its visual hour, or runs time
//! backwards by replacing the offset with one derived from the server
//! counter.

/// How a zone's projection deviates from the plain offset transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeOverride {
    /// No override: apply the static offset as-is.
    #[default]
    None,
    /// Pin the renderable time of day to a fixed hour (0-23).
    FixedHour(u32),
    /// Replace the static offset with `-2 * server_total`, so local time
    /// runs backwards at the server's own pace.
    ReverseFlow,
}

/// A predefined world timezone.
///
/// Offsets are expressed in simulated minutes relative to the server
/// clock. The UTC-style presets shift by whole simulated days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZonePreset {
    /// Server time, no shift.
    ServerTime,
    /// Six hours behind the server.
    EarlyMorning,
    /// Three hours behind the server.
    Morning,
    /// Three hours ahead of the server.
    Afternoon,
    /// Six hours ahead of the server.
    Evening,
    /// Nine hours ahead of the server.
    Night,
    /// Twelve hours ahead of the server.
    Midnight,
    /// Twelve simulated days behind the server.
    UtcMinus12,
    /// Six simulated days behind the server.
    UtcMinus6,
    /// Server time under its UTC-style name.
    Utc,
    /// Six simulated days ahead of the server.
    UtcPlus6,
    /// Twelve simulated days ahead of the server.
    UtcPlus12,
    /// Visual time pinned to noon.
    EternalDay,
    /// Visual time pinned to midnight.
    EternalNight,
    /// Local time flows backwards.
    Reversed,
}

impl ZonePreset {
    /// Return the static offset this preset applies, in simulated minutes.
    pub const fn offset_minutes(self) -> i64 {
        match self {
            Self::ServerTime | Self::Utc | Self::EternalDay | Self::EternalNight
            | Self::Reversed => 0,
            Self::EarlyMorning => -360,
            Self::Morning => -180,
            Self::Afternoon => 180,
            Self::Evening => 360,
            Self::Night => 540,
            Self::Midnight => 720,
            Self::UtcMinus12 => -17_280,
            Self::UtcMinus6 => -8_640,
            Self::UtcPlus6 => 8_640,
            Self::UtcPlus12 => 17_280,
        }
    }

    /// Return the override rule this preset carries.
    pub const fn override_rule(self) -> TimeOverride {
        match self {
            Self::EternalDay => TimeOverride::FixedHour(12),
            Self::EternalNight => TimeOverride::FixedHour(0),
            Self::Reversed => TimeOverride::ReverseFlow,
            _ => TimeOverride::None,
        }
    }

    /// Parse a preset from its configuration name.
    ///
    /// Names are matched case-insensitively in snake form, e.g.
    /// `eternal_day` or `utc_plus_6`. Unknown names return `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "server_time" => Some(Self::ServerTime),
            "early_morning" => Some(Self::EarlyMorning),
            "morning" => Some(Self::Morning),
            "afternoon" => Some(Self::Afternoon),
            "evening" => Some(Self::Evening),
            "night" => Some(Self::Night),
            "midnight" => Some(Self::Midnight),
            "utc_minus_12" => Some(Self::UtcMinus12),
            "utc_minus_6" => Some(Self::UtcMinus6),
            "utc" => Some(Self::Utc),
            "utc_plus_6" => Some(Self::UtcPlus6),
            "utc_plus_12" => Some(Self::UtcPlus12),
            "eternal_day" => Some(Self::EternalDay),
            "eternal_night" => Some(Self::EternalNight),
            "reversed" => Some(Self::Reversed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_parse_from_names() {
        assert_eq!(ZonePreset::from_name("evening"), Some(ZonePreset::Evening));
        assert_eq!(
            ZonePreset::from_name("ETERNAL_DAY"),
            Some(ZonePreset::EternalDay)
        );
        assert_eq!(ZonePreset::from_name("monsoon"), None);
    }

    #[test]
    fn offset_presets_carry_no_override() {
        assert_eq!(ZonePreset::Evening.offset_minutes(), 360);
        assert_eq!(ZonePreset::Evening.override_rule(), TimeOverride::None);
        assert_eq!(ZonePreset::UtcMinus12.offset_minutes(), -17_280);
    }

    #[test]
    fn fantasy_presets_carry_overrides() {
        assert_eq!(
            ZonePreset::EternalDay.override_rule(),
            TimeOverride::FixedHour(12)
        );
        assert_eq!(
            ZonePreset::EternalNight.override_rule(),
            TimeOverride::FixedHour(0)
        );
        assert_eq!(
            ZonePreset::Reversed.override_rule(),
            TimeOverride::ReverseFlow
        );
        assert_eq!(ZonePreset::Reversed.offset_minutes(), 0);
    }
}
