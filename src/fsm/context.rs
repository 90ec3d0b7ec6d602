//! Cycle-scoped values threaded through the control phases.
//!
//! A fresh [`CycleContext`] is created when a cycle leaves `Idle` and is
//! folded into a [`CycleReport`](crate::app::events::CycleReport) when it
//! returns there.  Nothing in here survives into the next cycle.

use log::warn;

use crate::app::events::RemoteOutcome;
use crate::app::ports::UNKNOWN_CONDITION_CODE;
use crate::error::SensorError;
use crate::sensors::anemometer::SpeedReading;
use crate::severity::ActuationIntent;

// ---------------------------------------------------------------------------
// Plausibility limits
// ---------------------------------------------------------------------------

/// DHT22 operating range.
pub const TEMPERATURE_RANGE_C: (f32, f32) = (-40.0, 80.0);
pub const HUMIDITY_RANGE_PCT: (f32, f32) = (0.0, 100.0);
pub const UV_INDEX_RANGE: (f32, f32) = (0.0, 20.0);
pub const SIGNAL_RANGE_DBM: (f32, f32) = (-120.0, 0.0);

/// Validate one raw reading.  NaN and out-of-range values are rejected.
pub fn validate_reading(raw: f32, (lo, hi): (f32, f32)) -> Result<f32, SensorError> {
    if raw.is_nan() {
        Err(SensorError::NotANumber)
    } else if raw < lo || raw > hi {
        Err(SensorError::OutOfRange)
    } else {
        Ok(raw)
    }
}

/// Like [`validate_reading`], logging the failure and mapping it to `None`.
pub fn accept_reading(label: &str, raw: f32, range: (f32, f32)) -> Option<f32> {
    match validate_reading(raw, range) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("Failed to read {}: {} ({})", label, e, raw);
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// One cycle's worth of validated readings.  `None` means the field is
/// skipped for this cycle only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements {
    pub temperature_c: Option<f32>,
    pub humidity_pct: Option<f32>,
    pub uv_index: Option<f32>,
    pub signal_dbm: Option<f32>,
    pub wind: SpeedReading,
}

impl Measurements {
    /// Number of fields that will be published.
    pub fn valid_fields(&self) -> usize {
        [self.temperature_c, self.humidity_pct, self.uv_index, self.signal_dbm]
            .iter()
            .filter(|v| v.is_some())
            .count()
            + 1
    }
}

// ---------------------------------------------------------------------------
// CycleContext
// ---------------------------------------------------------------------------

/// Blackboard for a single cycle.
#[derive(Debug, Clone)]
pub struct CycleContext {
    pub cycle: u64,
    pub started_at_ms: u64,
    pub measurements: Measurements,
    pub condition_code: i32,
    pub intent: ActuationIntent,
    pub remote: RemoteOutcome,
    pub published: usize,
}

impl CycleContext {
    pub fn new(cycle: u64, started_at_ms: u64) -> Self {
        Self {
            cycle,
            started_at_ms,
            measurements: Measurements::default(),
            condition_code: UNKNOWN_CONDITION_CODE,
            intent: ActuationIntent::CLEAR,
            remote: RemoteOutcome::Skipped,
            published: 0,
        }
    }
}
