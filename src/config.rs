//! System configuration parameters
//!
//! All tunable parameters for the WeatherNode.  Defaults reproduce the
//! bench station; a JSON override can be baked in at build time through the
//! `WEATHERNODE_CONFIG` environment variable (see `main.rs`).

use serde::{Deserialize, Serialize};

use crate::adapters::wifi::{validate_password, validate_ssid};
use crate::error::Error;

/// Core system configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub anemometer: AnemometerConfig,
    pub indicator: IndicatorConfig,
    pub timing: TimingConfig,
    pub bridge: BridgeConfig,
    pub weather: WeatherApiConfig,
    pub station: StationConfig,
    pub wifi: WifiConfig,
}

/// Hall-effect anemometer sampling and calibration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnemometerConfig {
    /// Length of the pulse-counting window (milliseconds).
    pub window_ms: u32,
    /// km/h per rpm of the transducer's linear fit.
    pub slope: f32,
    /// km/h offset of the linear fit (ignored at 0 rpm).
    pub intercept: f32,
    /// Maximum window time between watchdog feeds (milliseconds).
    pub watchdog_feed_interval_ms: u32,
}

impl Default for AnemometerConfig {
    fn default() -> Self {
        Self {
            window_ms: 10_000,
            slope: 0.075_153_53,
            intercept: 0.035_938_82,
            watchdog_feed_interval_ms: 1_000,
        }
    }
}

/// Local indicator playback timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Hold time of each wave step (milliseconds).
    pub wave_step_ms: u32,
    /// Pause after a full wave has been cleared (milliseconds).
    pub wave_pause_ms: u32,
    /// Hold time of each storm flash (milliseconds).
    pub storm_flash_hold_ms: u32,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            wave_step_ms: 100,
            wave_pause_ms: 1_000,
            storm_flash_hold_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Fixed delay at the start of every control cycle (milliseconds).
    pub inter_cycle_delay_ms: u32,
    /// Upper bound on any single HTTP request (milliseconds).
    pub http_timeout_ms: u32,
    /// Task watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            inter_cycle_delay_ms: 5_000,
            http_timeout_ms: 5_000,
            watchdog_timeout_ms: 15_000,
        }
    }
}

/// Remote lighting bridge (Hue-compatible REST API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Bridge host or IP.  Empty disables the remote channel.
    pub host: String,
    /// Whitelisted API username.
    pub username: String,
    /// Light group driven by the node.
    pub group: u16,
    /// Hue used for every precipitation level.
    pub rain_hue: u16,
    /// Hue used for thunderstorms.
    pub storm_hue: u16,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            username: String::new(),
            group: 5,
            rain_hue: 41_202,
            storm_hue: 9_493,
        }
    }
}

impl BridgeConfig {
    /// Whether enough is configured to talk to a bridge at all.
    pub fn is_configured(&self) -> bool {
        !self.host.is_empty() && !self.username.is_empty()
    }
}

/// Current-conditions provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherApiConfig {
    pub base_url: String,
    pub api_key: String,
    /// Fixed condition code used instead of the API (bench testing).
    pub condition_override: Option<i32>,
}

impl Default for WeatherApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://api.weatherapi.com/v1/current.json".into(),
            api_key: String::new(),
            condition_override: None,
        }
    }
}

/// Static station identity published once at start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    pub name: String,
    /// Station owner, announced with the device metadata.
    pub owner: String,
    pub model: String,
    pub latitude: f32,
    pub longitude: f32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            name: "Home Station".into(),
            owner: String::new(),
            model: "WeatherNode ESP32".into(),
            latitude: 51.943_62,
            longitude: 4.370_459,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
}

impl SystemConfig {
    /// Parse a (possibly partial) JSON document and validate the result.
    /// Missing sections and fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Longest stretch the loop blocks without feeding the watchdog: one
    /// feed slice, one HTTP request or one indicator hold.
    pub fn longest_unfed_ms(&self) -> u32 {
        let i = &self.indicator;
        [
            self.anemometer.watchdog_feed_interval_ms,
            self.timing.http_timeout_ms,
            i.wave_step_ms,
            i.wave_pause_ms,
            i.storm_flash_hold_ms,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }

    /// Reject values the control loop cannot run with.
    pub fn validate(&self) -> Result<(), Error> {
        let a = &self.anemometer;
        if a.window_ms == 0 {
            return Err(Error::Config("anemometer.window_ms must be > 0"));
        }
        if !a.slope.is_finite() || a.slope < 0.0 {
            return Err(Error::Config("anemometer.slope must be finite and >= 0"));
        }
        if !a.intercept.is_finite() {
            return Err(Error::Config("anemometer.intercept must be finite"));
        }
        if a.watchdog_feed_interval_ms == 0 {
            return Err(Error::Config("anemometer.watchdog_feed_interval_ms must be > 0"));
        }

        let t = &self.timing;
        if t.http_timeout_ms == 0 {
            return Err(Error::Config("timing.http_timeout_ms must be > 0"));
        }
        if self.indicator.wave_step_ms == 0 {
            return Err(Error::Config("indicator.wave_step_ms must be > 0"));
        }
        if t.watchdog_timeout_ms <= self.longest_unfed_ms() {
            return Err(Error::Config(
                "timing.watchdog_timeout_ms must exceed the longest blocking step",
            ));
        }

        let b = &self.bridge;
        if b.host.contains('/') || b.username.contains('/') {
            return Err(Error::Config("bridge host/username must not contain '/'"));
        }

        let w = &self.wifi;
        if !w.ssid.is_empty() {
            validate_ssid(&w.ssid).map_err(|_| Error::Config("wifi.ssid invalid"))?;
            validate_password(&w.password).map_err(|_| Error::Config("wifi.password invalid"))?;
        }

        if !(-90.0..=90.0).contains(&self.station.latitude)
            || !(-180.0..=180.0).contains(&self.station.longitude)
        {
            return Err(Error::Config("station coordinates out of range"));
        }
        Ok(())
    }
}
