//! Weather severity classification.
//!
//! Maps a weatherapi.com condition code onto a [`SeverityLevel`] and the
//! [`ActuationIntent`] both actuation channels consume.  Pure and total over
//! `i32`: any code outside the table, including
//! [`UNKNOWN_CONDITION_CODE`](crate::app::ports::UNKNOWN_CONDITION_CODE),
//! classifies as [`SeverityLevel::Clear`].

use crate::config::BridgeConfig;

/// Discrete weather intensity, ordered from calm to severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum SeverityLevel {
    Clear = 0,
    LightPrecipitation = 1,
    ModeratePrecipitation = 2,
    HeavyPrecipitation = 3,
    Storm = 4,
}

impl SeverityLevel {
    /// Number of local wave repetitions for precipitation levels.
    pub const fn wave_repeats(self) -> u8 {
        match self {
            Self::LightPrecipitation => 1,
            Self::ModeratePrecipitation => 2,
            Self::HeavyPrecipitation => 3,
            Self::Clear | Self::Storm => 0,
        }
    }

    pub const fn is_precipitation(self) -> bool {
        matches!(
            self,
            Self::LightPrecipitation | Self::ModeratePrecipitation | Self::HeavyPrecipitation
        )
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::LightPrecipitation => "light-precipitation",
            Self::ModeratePrecipitation => "moderate-precipitation",
            Self::HeavyPrecipitation => "heavy-precipitation",
            Self::Storm => "storm",
        }
    }
}

/// Bridge colour code (Hue scale, 0–65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeColor {
    pub hue: u16,
}

/// What both actuation channels should do this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuationIntent {
    pub level: SeverityLevel,
    pub desired_bridge_power: bool,
    pub desired_bridge_color: Option<BridgeColor>,
}

impl ActuationIntent {
    /// Lights off, nothing to show.
    pub const CLEAR: Self = Self {
        level: SeverityLevel::Clear,
        desired_bridge_power: false,
        desired_bridge_color: None,
    };
}

/// Level for a weatherapi.com condition code; never fails.
pub fn level_for_code(code: i32) -> SeverityLevel {
    match code {
        // thunder, patchy / light / moderate-or-heavy rain or snow with thunder
        1087 | 1273 | 1276 | 1279 | 1282 => SeverityLevel::Storm,
        // heavy rain at times, heavy rain, torrential shower
        1192 | 1195 | 1246 => SeverityLevel::HeavyPrecipitation,
        // moderate rain at times, moderate rain, moderate-or-heavy shower
        1186 | 1189 | 1243 => SeverityLevel::ModeratePrecipitation,
        // drizzle, patchy light / light rain, light shower
        1150 | 1153 | 1180 | 1183 | 1240 => SeverityLevel::LightPrecipitation,
        // 1000 (sunny / clear) and everything unrecognised
        _ => SeverityLevel::Clear,
    }
}

/// Classifier carrying the bridge palette.
#[derive(Debug, Clone, Copy)]
pub struct SeverityClassifier {
    rain: BridgeColor,
    storm: BridgeColor,
}

impl Default for SeverityClassifier {
    fn default() -> Self {
        Self::from_config(&BridgeConfig::default())
    }
}

impl SeverityClassifier {
    pub fn new(rain_hue: u16, storm_hue: u16) -> Self {
        Self {
            rain: BridgeColor { hue: rain_hue },
            storm: BridgeColor { hue: storm_hue },
        }
    }

    pub fn from_config(bridge: &BridgeConfig) -> Self {
        Self::new(bridge.rain_hue, bridge.storm_hue)
    }

    /// Map a condition code to this cycle's actuation intent.
    pub fn classify(&self, condition_code: i32) -> ActuationIntent {
        let level = level_for_code(condition_code);
        let color = match level {
            SeverityLevel::Clear => return ActuationIntent::CLEAR,
            SeverityLevel::Storm => self.storm,
            _ => self.rain,
        };
        ActuationIntent {
            level,
            desired_bridge_power: true,
            desired_bridge_color: Some(color),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heavy_rain_scenario() {
        let intent = SeverityClassifier::default().classify(1195);
        assert_eq!(intent.level, SeverityLevel::HeavyPrecipitation);
        assert!(intent.desired_bridge_power);
        assert_eq!(intent.desired_bridge_color, Some(BridgeColor { hue: 41_202 }));
        assert_eq!(intent.level.wave_repeats(), 3);
    }

    #[test]
    fn every_storm_code_uses_storm_hue() {
        let c = SeverityClassifier::default();
        for code in [1087, 1273, 1276, 1279, 1282] {
            let intent = c.classify(code);
            assert_eq!(intent.level, SeverityLevel::Storm, "code {code}");
            assert_eq!(intent.desired_bridge_color, Some(BridgeColor { hue: 9_493 }));
        }
    }

    #[test]
    fn rain_tiers() {
        assert_eq!(level_for_code(1183), SeverityLevel::LightPrecipitation);
        assert_eq!(level_for_code(1153), SeverityLevel::LightPrecipitation);
        assert_eq!(level_for_code(1189), SeverityLevel::ModeratePrecipitation);
        assert_eq!(level_for_code(1192), SeverityLevel::HeavyPrecipitation);
    }

    #[test]
    fn clear_and_unknown_turn_bridge_off() {
        let c = SeverityClassifier::default();
        assert_eq!(c.classify(1000), ActuationIntent::CLEAR);
        assert_eq!(c.classify(1100), ActuationIntent::CLEAR);
        assert_eq!(c.classify(-1), ActuationIntent::CLEAR);
        assert_eq!(c.classify(i32::MIN), ActuationIntent::CLEAR);
    }

    #[test]
    fn levels_are_ordered_by_intensity() {
        assert!(SeverityLevel::Clear < SeverityLevel::LightPrecipitation);
        assert!(SeverityLevel::LightPrecipitation < SeverityLevel::ModeratePrecipitation);
        assert!(SeverityLevel::ModeratePrecipitation < SeverityLevel::HeavyPrecipitation);
        assert!(SeverityLevel::HeavyPrecipitation < SeverityLevel::Storm);
    }

    #[test]
    fn custom_palette_applies() {
        let c = SeverityClassifier::new(100, 200);
        assert_eq!(c.classify(1180).desired_bridge_color, Some(BridgeColor { hue: 100 }));
        assert_eq!(c.classify(1087).desired_bridge_color, Some(BridgeColor { hue: 200 }));
    }
}
