//! Hall-effect cup anemometer: pulse window → rpm → km/h.
//!
//! The rotor closes the hall sensor once per revolution.  Rather than an
//! ISR counter, the meter busy-polls the input for a fixed window so the
//! count is tied to an exact interval:
//!
//! - a high reading latches the edge,
//! - the next low reading counts one pulse and clears the latch,
//!
//! so a rotor parked over the magnet (level held high) counts once, not
//! once per poll.  The window is far longer than the task watchdog period,
//! so the loop feeds the watchdog as it goes.
//!
//! Conversion to speed uses the transducer's linear fit, except that a
//! stationary rotor always reads exactly 0 km/h instead of the fit's
//! intercept.

use log::{debug, warn};

use crate::app::ports::{SensorPort, TimePort, WatchdogPort};
use crate::config::AnemometerConfig;

/// Milliseconds in the rpm basis.
const MS_PER_MINUTE: u64 = 60_000;

/// Linear transducer calibration `speed_kmh = slope * rpm + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnemometerCalibration {
    pub slope: f32,
    pub intercept: f32,
}

impl AnemometerCalibration {
    pub fn speed_kmh(&self, rpm: u32) -> f32 {
        if rpm == 0 {
            return 0.0;
        }
        // Never negative, whatever the fit's intercept.
        (self.slope * rpm as f32 + self.intercept).max(0.0)
    }
}

/// Pulses counted over one sampling window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseWindowSample {
    pulse_count: u32,
    window_duration_ms: u32,
}

impl PulseWindowSample {
    /// `None` for an empty window.
    pub fn new(pulse_count: u32, window_duration_ms: u32) -> Option<Self> {
        (window_duration_ms > 0).then_some(Self {
            pulse_count,
            window_duration_ms,
        })
    }

    pub fn pulse_count(&self) -> u32 {
        self.pulse_count
    }

    pub fn window_duration_ms(&self) -> u32 {
        self.window_duration_ms
    }

    /// Extrapolate the count to a one-minute basis (floored).
    pub fn rpm(&self) -> u32 {
        let rpm = u64::from(self.pulse_count) * MS_PER_MINUTE / u64::from(self.window_duration_ms);
        u32::try_from(rpm).unwrap_or(u32::MAX)
    }

    pub fn reduce(self, calibration: &AnemometerCalibration) -> SpeedReading {
        let rpm = self.rpm();
        SpeedReading {
            rotations_per_minute: rpm,
            speed_kmh: calibration.speed_kmh(rpm),
        }
    }
}

/// Derived wind measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SpeedReading {
    pub rotations_per_minute: u32,
    pub speed_kmh: f32,
}

impl SpeedReading {
    pub const ZERO: Self = Self {
        rotations_per_minute: 0,
        speed_kmh: 0.0,
    };
}

/// Blocking pulse-window meter.
#[derive(Debug, Clone, Copy)]
pub struct PulseRateMeter {
    calibration: AnemometerCalibration,
    feed_interval_ms: u64,
}

impl PulseRateMeter {
    pub fn new(calibration: AnemometerCalibration, feed_interval_ms: u32) -> Self {
        Self {
            calibration,
            feed_interval_ms: u64::from(feed_interval_ms.max(1)),
        }
    }

    pub fn from_config(cfg: &AnemometerConfig) -> Self {
        Self::new(
            AnemometerCalibration {
                slope: cfg.slope,
                intercept: cfg.intercept,
            },
            cfg.watchdog_feed_interval_ms,
        )
    }

    pub fn calibration(&self) -> &AnemometerCalibration {
        &self.calibration
    }

    /// Count complete pulses for `window_duration_ms` and convert.
    ///
    /// Blocks for the whole window.  Never fails: no pulses (or an empty
    /// window) is a valid zero reading.
    pub fn measure<N>(&self, node: &mut N, window_duration_ms: u32) -> SpeedReading
    where
        N: SensorPort + TimePort + WatchdogPort,
    {
        let Some(sample) = self.sample(node, window_duration_ms) else {
            warn!("Anemometer: empty sampling window, reporting calm");
            return SpeedReading::ZERO;
        };
        let reading = sample.reduce(&self.calibration);
        debug!(
            "Anemometer: {} pulses / {} ms -> {} rpm -> {:.2} km/h",
            sample.pulse_count(),
            sample.window_duration_ms(),
            reading.rotations_per_minute,
            reading.speed_kmh
        );
        reading
    }

    /// The polling loop proper.
    pub fn sample<N>(&self, node: &mut N, window_duration_ms: u32) -> Option<PulseWindowSample>
    where
        N: SensorPort + TimePort + WatchdogPort,
    {
        if window_duration_ms == 0 {
            return None;
        }
        let window = u64::from(window_duration_ms);
        let start = node.uptime_ms();
        let mut last_feed = start;
        let mut latched = false;
        let mut count: u32 = 0;

        node.feed();
        loop {
            let now = node.uptime_ms();
            if now.saturating_sub(start) >= window {
                break;
            }
            if now.saturating_sub(last_feed) >= self.feed_interval_ms {
                node.feed();
                last_feed = now;
            }

            if node.read_pulse_level() {
                latched = true;
            } else if latched {
                count = count.saturating_add(1);
                latched = false;
            }
        }

        PulseWindowSample::new(count, window_duration_ms)
    }
}
