//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlLoop (domain)
//! ```
//!
//! Driven adapters (sensors, indicator strip, HTTP, telemetry) implement
//! these traits.  The [`ControlLoop`](super::service::ControlLoop) consumes
//! them via generics, so the domain core never touches hardware or sockets
//! directly and every phase can be exercised with mocks.

use crate::drivers::indicator::Pixels;
use crate::error::TransportError;

use super::events::{AppEvent, TelemetryField};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain raw readings.
///
/// Analog readings return `f32::NAN` when the driver has nothing valid;
/// the control loop treats NaN as "skip this field for one cycle".
pub trait SensorPort {
    fn read_temperature_c(&mut self) -> f32;

    fn read_humidity_pct(&mut self) -> f32;

    fn read_uv_index(&mut self) -> f32;

    /// Instantaneous level of the anemometer's pulse input.
    fn read_pulse_level(&mut self) -> bool;

    /// Link signal strength in dBm, NaN when not associated.
    fn read_signal_strength_dbm(&mut self) -> f32 {
        f32::NAN
    }
}

// ───────────────────────────────────────────────────────────────
// Time and liveness
// ───────────────────────────────────────────────────────────────

/// Monotonic clock plus blocking delay.
pub trait TimePort {
    /// Milliseconds since boot (monotonic).
    fn uptime_ms(&self) -> u64;

    /// Block the calling task for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Platform watchdog servicing.  Must be called more often than the
/// watchdog timeout during any long blocking section.
pub trait WatchdogPort {
    fn feed(&self);
}

// ───────────────────────────────────────────────────────────────
// Indicator port (driven adapter: domain → LED array)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the local addressable indicator array.
///
/// Infallible by contract: a missing or broken strip just shows nothing.
pub trait IndicatorPort {
    fn show(&mut self, pixels: &Pixels);
}

// ───────────────────────────────────────────────────────────────
// HTTP transport
// ───────────────────────────────────────────────────────────────

/// A complete HTTP response.  Any status code is a response; only
/// failures to obtain one are [`TransportError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking HTTP client.  Implementations open a fresh connection per call
/// and bound every request with a timeout.
pub trait HttpPort {
    fn get(&mut self, url: &str) -> Result<HttpResponse, TransportError>;

    /// PUT a JSON body.
    fn put(&mut self, url: &str, body: &str) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Weather conditions
// ───────────────────────────────────────────────────────────────

/// Sentinel returned by a [`ConditionCodeSource`] when the provider could
/// not be reached or parsed.  Classifies as clear weather.
pub const UNKNOWN_CONDITION_CODE: i32 = -1;

/// External current-conditions provider.
pub trait ConditionCodeSource {
    /// Current condition code, or [`UNKNOWN_CONDITION_CODE`].
    fn fetch_current_code(&mut self) -> i32;
}

// ───────────────────────────────────────────────────────────────
// Telemetry / event sinks (driven adapter: domain → backend, logs)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget per-reading publication.  Implementations must not
/// block the control loop on the backend.
pub trait TelemetrySink {
    fn publish(&mut self, field: TelemetryField, value: f32);
}

/// The domain emits structured [`AppEvent`]s through this port.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}
