//! Outbound application events and telemetry field catalogue.
//!
//! The [`ControlLoop`](super::service::ControlLoop) emits [`AppEvent`]s
//! through the [`EventSink`](super::ports::EventSink) port and individual
//! readings through [`TelemetrySink`](super::ports::TelemetrySink).
//! Adapters on the other side decide what to do with them: log to serial,
//! publish over MQTT, and so on.

use crate::adapters::device_id::DeviceIdString;
use crate::bridge::BridgeAction;
use crate::error::ActuationError;
use crate::fsm::context::Measurements;
use crate::severity::ActuationIntent;

/// Every value the node publishes, with the metadata a monitoring backend
/// (Home Assistant discovery) needs to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryField {
    Temperature,
    Humidity,
    UvIndex,
    WindSpeed,
    SignalStrength,
    Latitude,
    Longitude,
}

impl TelemetryField {
    /// Stable machine name, used as the topic / entity suffix.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Humidity => "humidity",
            Self::UvIndex => "uv_index",
            Self::WindSpeed => "wind_speed",
            Self::SignalStrength => "signal_strength",
            Self::Latitude => "lat",
            Self::Longitude => "long",
        }
    }

    pub const fn unit(self) -> Option<&'static str> {
        match self {
            Self::Temperature => Some("\u{00b0}C"),
            Self::Humidity => Some("%"),
            Self::WindSpeed => Some("km/h"),
            Self::SignalStrength => Some("dBm"),
            Self::UvIndex | Self::Latitude | Self::Longitude => None,
        }
    }

    pub const fn device_class(self) -> Option<&'static str> {
        match self {
            Self::Temperature => Some("temperature"),
            Self::Humidity => Some("humidity"),
            Self::SignalStrength => Some("signal_strength"),
            _ => None,
        }
    }

    pub const fn icon(self) -> Option<&'static str> {
        match self {
            Self::UvIndex => Some("mdi:sun-wireless"),
            Self::WindSpeed => Some("mdi:weather-windy"),
            Self::Latitude | Self::Longitude => Some("mdi:crosshairs-gps"),
            _ => None,
        }
    }
}

/// Firmware version announced at start-up.
pub const SOFTWARE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Device metadata a monitoring backend registers the station under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationInfo {
    /// Full-MAC unique id; every telemetry entity is keyed on it.
    pub unique_id: DeviceIdString,
    pub name: String,
    pub owner: String,
    pub model: String,
    pub software_version: &'static str,
}

/// Outcome of the remote actuation phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteOutcome {
    /// No bridge configured.
    Skipped,
    Applied(BridgeAction),
    Failed(ActuationError),
}

/// Summary of one completed control cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    /// 1-based cycle number since start-up.
    pub cycle: u64,
    pub measurements: Measurements,
    pub condition_code: i32,
    pub intent: ActuationIntent,
    pub remote: RemoteOutcome,
    /// Number of telemetry fields handed to the sink.
    pub published: usize,
    pub duration_ms: u64,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The control loop has started.
    Started(StationInfo),

    /// The bridge group was switched on or off this cycle.
    BridgeSwitched { on: bool },

    /// The bridge could not be read or written this cycle.
    BridgeFailed(ActuationError),

    /// A full cycle finished.
    CycleCompleted(CycleReport),
}
