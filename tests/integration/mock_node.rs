//! Mock adapters for integration tests.
//!
//! Records every indicator frame, HTTP request and telemetry value so tests
//! can assert on the full history without hardware or a network.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weathernode::adapters::device_id::DeviceIdString;
use weathernode::app::events::{AppEvent, TelemetryField};
use weathernode::app::ports::{
    EventSink, HttpPort, HttpResponse, IndicatorPort, SensorPort, TelemetrySink, TimePort,
    WatchdogPort,
};
use weathernode::config::SystemConfig;
use weathernode::drivers::indicator::Pixels;
use weathernode::error::TransportError;

// ── MockNode ──────────────────────────────────────────────────

/// Sensors, strip, clock and watchdog in one.  The clock advances 1 ms per
/// `uptime_ms()` call so busy-wait loops terminate.
pub struct MockNode {
    /// Shared so a [`MockBridge`] can charge request latency to it.
    pub now: Rc<Cell<u64>>,
    pub temperature_c: f32,
    pub humidity_pct: f32,
    pub uv_index: f32,
    pub signal_dbm: f32,
    /// Anemometer square-wave period; 0 = rotor still.
    pub pulse_period_ms: u64,
    pub frames: Vec<Pixels>,
    pub feeds: Cell<u32>,
    /// Clock reading at every watchdog feed.
    pub fed_at: RefCell<Vec<u64>>,
    pub slept_ms: u64,
}

#[allow(dead_code)]
impl MockNode {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(0)),
            temperature_c: 18.5,
            humidity_pct: 72.0,
            uv_index: 1.2,
            signal_dbm: -61.0,
            pulse_period_ms: 0,
            frames: Vec::new(),
            feeds: Cell::new(0),
            fed_at: RefCell::new(Vec::new()),
            slept_ms: 0,
        }
    }

    /// Longest interval between consecutive feeds so far.
    pub fn max_feed_gap_ms(&self) -> u64 {
        self.fed_at
            .borrow()
            .windows(2)
            .map(|w| w[1] - w[0])
            .max()
            .unwrap_or(0)
    }
}

impl Default for MockNode {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockNode {
    fn read_temperature_c(&mut self) -> f32 {
        self.temperature_c
    }

    fn read_humidity_pct(&mut self) -> f32 {
        self.humidity_pct
    }

    fn read_uv_index(&mut self) -> f32 {
        self.uv_index
    }

    fn read_pulse_level(&mut self) -> bool {
        let p = self.pulse_period_ms;
        p != 0 && self.now.get() % p < p / 2
    }

    fn read_signal_strength_dbm(&mut self) -> f32 {
        self.signal_dbm
    }
}

impl TimePort for MockNode {
    fn uptime_ms(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + 1);
        t
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now.set(self.now.get() + u64::from(ms));
        self.slept_ms += u64::from(ms);
    }
}

impl WatchdogPort for MockNode {
    fn feed(&self) {
        self.feeds.set(self.feeds.get() + 1);
        self.fed_at.borrow_mut().push(self.now.get());
    }
}

impl IndicatorPort for MockNode {
    fn show(&mut self, pixels: &Pixels) {
        self.frames.push(*pixels);
    }
}

// ── MockBridge ────────────────────────────────────────────────

/// Hue-style bridge holding one group's power state.
pub struct MockBridge {
    pub on: bool,
    pub reachable: bool,
    pub gets: usize,
    pub puts: Vec<(String, String)>,
    /// Node clock advanced by `latency_ms` on every request.
    pub clock: Option<Rc<Cell<u64>>>,
    pub latency_ms: u64,
}

#[allow(dead_code)]
impl MockBridge {
    pub fn new(on: bool) -> Self {
        Self {
            on,
            reachable: true,
            gets: 0,
            puts: Vec::new(),
            clock: None,
            latency_ms: 0,
        }
    }

    /// Every request takes `latency_ms` of `node`'s clock.
    pub fn slow(on: bool, node: &MockNode, latency_ms: u64) -> Self {
        Self {
            clock: Some(Rc::clone(&node.now)),
            latency_ms,
            ..Self::new(on)
        }
    }

    fn spend(&self) {
        if let Some(clock) = &self.clock {
            clock.set(clock.get() + self.latency_ms);
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new(false)
        }
    }
}

impl HttpPort for MockBridge {
    fn get(&mut self, _url: &str) -> Result<HttpResponse, TransportError> {
        self.gets += 1;
        self.spend();
        if !self.reachable {
            return Err(TransportError::Connect);
        }
        Ok(HttpResponse {
            status: 200,
            body: format!(r#"{{"name":"Living room","action":{{"on":{},"hue":8418}}}}"#, self.on),
        })
    }

    fn put(&mut self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        self.puts.push((url.to_string(), body.to_string()));
        self.spend();
        if !self.reachable {
            return Err(TransportError::Connect);
        }
        self.on = body.contains(r#""on":true"#);
        Ok(HttpResponse {
            status: 200,
            body: format!(r#"[{{"success":{{"/groups/5/action/on":{}}}}}]"#, self.on),
        })
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub published: Vec<(TelemetryField, f32)>,
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn fields(&self) -> Vec<TelemetryField> {
        self.published.iter().map(|(f, _)| *f).collect()
    }

    pub fn value_of(&self, field: TelemetryField) -> Option<f32> {
        self.published
            .iter()
            .rev()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| *v)
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, field: TelemetryField, value: f32) {
        self.published.push((field, value));
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Helpers ───────────────────────────────────────────────────

pub fn station_id() -> DeviceIdString {
    DeviceIdString::try_from("240ac45e701d").unwrap()
}

/// Defaults plus a configured bridge.
pub fn bridged_config() -> SystemConfig {
    let mut c = SystemConfig::default();
    c.bridge.host = "192.168.1.2".into();
    c.bridge.username = "weathernode".into();
    c
}
