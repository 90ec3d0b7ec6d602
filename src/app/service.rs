//! Application service, the hexagonal core.
//!
//! [`ControlLoop`] owns the cycle FSM, the domain components and every
//! adapter it talks to.  Each call to [`ControlLoop::run_one_cycle`] walks
//! the phase ring once, strictly in order, and returns a [`CycleReport`].
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────────┐ ──▶ IndicatorPort
//!    TimePort ──▶ │         ControlLoop          │ ──▶ HttpPort (bridge)
//! ConditionCode ─▶│ meter · classifier · drivers │ ──▶ TelemetrySink
//!                 └──────────────────────────────┘ ──▶ EventSink
//! ```
//!
//! Nothing in a cycle is fatal.  Sensor failures drop a field, bridge
//! failures are reported and retried by the next cycle's fresh GET, and
//! the local indicator runs regardless of the remote outcome.

use log::{debug, info, trace, warn};

use crate::adapters::device_id::DeviceIdString;
use crate::bridge::{BridgeAction, RemoteBridgeActuator};
use crate::config::SystemConfig;
use crate::drivers::indicator::LocalIndicatorDriver;
use crate::fsm::context::{
    CycleContext, HUMIDITY_RANGE_PCT, Measurements, SIGNAL_RANGE_DBM, TEMPERATURE_RANGE_C,
    UV_INDEX_RANGE, accept_reading,
};
use crate::fsm::{CycleFsm, CyclePhase};
use crate::sensors::anemometer::PulseRateMeter;
use crate::severity::SeverityClassifier;

use super::events::{
    AppEvent, CycleReport, RemoteOutcome, SOFTWARE_VERSION, StationInfo, TelemetryField,
};
use super::ports::{
    ConditionCodeSource, EventSink, HttpPort, IndicatorPort, SensorPort, TelemetrySink, TimePort,
    WatchdogPort,
};

// ───────────────────────────────────────────────────────────────
// ControlLoop
// ───────────────────────────────────────────────────────────────

/// The measurement-to-actuation loop.
///
/// - `N`: the node (sensors, indicator strip, clock, watchdog)
/// - `H`: HTTP transport to the lighting bridge
/// - `C`: current-conditions provider
/// - `S`: telemetry and event sink
pub struct ControlLoop<N, H, C, S>
where
    H: HttpPort,
{
    config: SystemConfig,
    station_id: DeviceIdString,
    fsm: CycleFsm,
    meter: PulseRateMeter,
    classifier: SeverityClassifier,
    indicator: LocalIndicatorDriver,
    bridge: Option<RemoteBridgeActuator<H>>,
    node: N,
    conditions: C,
    sink: S,
}

impl<N, H, C, S> ControlLoop<N, H, C, S>
where
    N: SensorPort + TimePort + WatchdogPort + IndicatorPort,
    H: HttpPort,
    C: ConditionCodeSource,
    S: TelemetrySink + EventSink,
{
    /// Wire the loop from configuration.  The bridge channel is disabled
    /// when no bridge host/username is configured.
    pub fn new(
        config: SystemConfig,
        station_id: DeviceIdString,
        node: N,
        bridge_http: H,
        conditions: C,
        sink: S,
    ) -> Self {
        let bridge = if config.bridge.is_configured() {
            Some(RemoteBridgeActuator::new(bridge_http, &config.bridge))
        } else {
            info!("ControlLoop: no bridge configured, remote channel disabled");
            None
        };
        Self {
            meter: PulseRateMeter::from_config(&config.anemometer),
            classifier: SeverityClassifier::from_config(&config.bridge),
            indicator: LocalIndicatorDriver::new(config.indicator.clone()),
            fsm: CycleFsm::new(),
            config,
            station_id,
            bridge,
            node,
            conditions,
            sink,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce the station's metadata and publish its static coordinates.
    pub fn start(&mut self) {
        let station = &self.config.station;
        self.sink.emit(&AppEvent::Started(StationInfo {
            unique_id: self.station_id.clone(),
            name: station.name.clone(),
            owner: station.owner.clone(),
            model: station.model.clone(),
            software_version: SOFTWARE_VERSION,
        }));
        self.sink
            .publish(TelemetryField::Latitude, self.config.station.latitude);
        self.sink
            .publish(TelemetryField::Longitude, self.config.station.longitude);
        info!(
            "ControlLoop started: {} '{}' at {:.5},{:.5}",
            self.station_id,
            self.config.station.name,
            self.config.station.latitude,
            self.config.station.longitude
        );
    }

    /// Run one full cycle: `Idle → … → PublishTelemetry → Idle`.
    pub fn run_one_cycle(&mut self) -> CycleReport {
        let started_at = self.node.uptime_ms();
        let mut ctx = CycleContext::new(self.fsm.cycle_count() + 1, started_at);

        loop {
            let phase = self.fsm.current_phase();
            self.run_phase(phase, &mut ctx);
            self.node.feed();
            if self.fsm.advance(self.node.uptime_ms()) == CyclePhase::Idle {
                break;
            }
        }

        let report = CycleReport {
            cycle: ctx.cycle,
            measurements: ctx.measurements,
            condition_code: ctx.condition_code,
            intent: ctx.intent,
            remote: ctx.remote,
            published: ctx.published,
            duration_ms: self.node.uptime_ms().saturating_sub(started_at),
        };
        self.sink.emit(&AppEvent::CycleCompleted(report.clone()));
        report
    }

    // ── Phases ────────────────────────────────────────────────

    fn run_phase(&mut self, phase: CyclePhase, ctx: &mut CycleContext) {
        match phase {
            CyclePhase::Idle => self.pause(self.config.timing.inter_cycle_delay_ms),
            CyclePhase::AcquireMeasurements => self.acquire(ctx),
            CyclePhase::ComputeDerived => {
                let wind = ctx.measurements.wind;
                trace!(
                    "derived: {} rpm -> {:.2} km/h",
                    wind.rotations_per_minute, wind.speed_kmh
                );
            }
            CyclePhase::Classify => {
                ctx.condition_code = self.conditions.fetch_current_code();
                ctx.intent = self.classifier.classify(ctx.condition_code);
                debug!(
                    "classified code {} as {}",
                    ctx.condition_code,
                    ctx.intent.level.name()
                );
            }
            CyclePhase::ActuateLocal => {
                self.indicator.render(ctx.intent.level, &mut self.node);
            }
            CyclePhase::ActuateRemote => ctx.remote = self.actuate_remote(ctx),
            CyclePhase::PublishTelemetry => ctx.published = self.publish(&ctx.measurements),
        }
    }

    /// Block for `ms`, feeding the watchdog at the anemometer feed interval.
    fn pause(&mut self, ms: u32) {
        let slice = self.config.anemometer.watchdog_feed_interval_ms.max(1);
        let mut remaining = ms;
        while remaining > 0 {
            let step = remaining.min(slice);
            self.node.delay_ms(step);
            self.node.feed();
            remaining -= step;
        }
    }

    fn acquire(&mut self, ctx: &mut CycleContext) {
        let n = &mut self.node;
        let mut m = Measurements {
            temperature_c: accept_reading("temperature", n.read_temperature_c(), TEMPERATURE_RANGE_C),
            humidity_pct: accept_reading("humidity", n.read_humidity_pct(), HUMIDITY_RANGE_PCT),
            uv_index: accept_reading("UV index", n.read_uv_index(), UV_INDEX_RANGE),
            signal_dbm: accept_reading("signal strength", n.read_signal_strength_dbm(), SIGNAL_RANGE_DBM),
            ..Measurements::default()
        };
        m.wind = self.meter.measure(&mut self.node, self.config.anemometer.window_ms);
        ctx.measurements = m;
    }

    fn actuate_remote(&mut self, ctx: &CycleContext) -> RemoteOutcome {
        let Some(bridge) = self.bridge.as_mut() else {
            return RemoteOutcome::Skipped;
        };
        let node = &self.node;
        match bridge.apply_with(&ctx.intent, || node.feed()) {
            Ok(action) => {
                if let BridgeAction::Switched { on } = action {
                    self.sink.emit(&AppEvent::BridgeSwitched { on });
                }
                RemoteOutcome::Applied(action)
            }
            Err(e) => {
                warn!("cycle {}: bridge not updated: {}", ctx.cycle, e);
                self.sink.emit(&AppEvent::BridgeFailed(e));
                RemoteOutcome::Failed(e)
            }
        }
    }

    /// Publish every valid field plus wind speed; returns the count.
    fn publish(&mut self, m: &Measurements) -> usize {
        let fields = [
            (TelemetryField::Temperature, m.temperature_c),
            (TelemetryField::Humidity, m.humidity_pct),
            (TelemetryField::UvIndex, m.uv_index),
            (TelemetryField::WindSpeed, Some(m.wind.speed_kmh)),
            (TelemetryField::SignalStrength, m.signal_dbm),
        ];
        let mut published = 0;
        for (field, value) in fields {
            if let Some(v) = value {
                self.sink.publish(field, v);
                published += 1;
            }
        }
        published
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }

    pub fn station_id(&self) -> &str {
        &self.station_id
    }

    pub fn cycle_count(&self) -> u64 {
        self.fsm.cycle_count()
    }

    pub fn current_phase(&self) -> CyclePhase {
        self.fsm.current_phase()
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut N {
        &mut self.node
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Bridge transport, `None` when the remote channel is disabled.
    pub fn bridge_http(&self) -> Option<&H> {
        self.bridge.as_ref().map(RemoteBridgeActuator::http)
    }
}
