//! Log-based telemetry and event sink.
//!
//! Implements [`TelemetrySink`] and [`EventSink`] by writing to the `log`
//! facade (ESP-IDF logger on target, which goes to UART / USB-CDC).
//! An MQTT or Home Assistant adapter would implement the same traits and
//! use the field metadata for discovery.

use log::{info, warn};

use crate::adapters::device_id::DeviceIdString;
use crate::app::events::{AppEvent, RemoteOutcome, TelemetryField};
use crate::app::ports::{EventSink, TelemetrySink};

/// Adapter that logs every reading and [`AppEvent`] to the serial console.
pub struct LogTelemetrySink {
    station: DeviceIdString,
    published: u64,
}

impl LogTelemetrySink {
    pub fn new(station: DeviceIdString) -> Self {
        Self {
            station,
            published: 0,
        }
    }

    /// Readings published since start-up.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl TelemetrySink for LogTelemetrySink {
    fn publish(&mut self, field: TelemetryField, value: f32) {
        self.published += 1;
        info!(
            "TELEM | {}_{} = {:.2}{}",
            self.station,
            field.name(),
            value,
            field.unit().unwrap_or("")
        );
    }
}

impl EventSink for LogTelemetrySink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(info) => {
                info!(
                    "START | {} ({}) owner='{}' model='{}' sw={}",
                    info.name, info.unique_id, info.owner, info.model, info.software_version
                );
            }
            AppEvent::BridgeSwitched { on } => {
                info!("BRIDGE | switched {}", if *on { "on" } else { "off" });
            }
            AppEvent::BridgeFailed(e) => {
                warn!("BRIDGE | failed: {}", e);
            }
            AppEvent::CycleCompleted(r) => {
                let remote = match r.remote {
                    RemoteOutcome::Skipped => "skipped",
                    RemoteOutcome::Applied(_) => "ok",
                    RemoteOutcome::Failed(_) => "failed",
                };
                info!(
                    "CYCLE | #{} | code={} level={} | wind={:.2}km/h ({} rpm) | \
                     published={} | bridge={} | {} ms",
                    r.cycle,
                    r.condition_code,
                    r.intent.level.name(),
                    r.measurements.wind.speed_kmh,
                    r.measurements.wind.rotations_per_minute,
                    r.published,
                    remote,
                    r.duration_ms,
                );
            }
        }
    }
}
