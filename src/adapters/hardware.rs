//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the [`SensorHub`], the indicator strip, the clock, the watchdog and
//! the WiFi link, exposing them through [`SensorPort`], [`IndicatorPort`],
//! [`TimePort`] and [`WatchdogPort`].  This is the only module in the
//! system that touches actual hardware.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;

use crate::adapters::time::Esp32TimeAdapter;
use crate::adapters::wifi::{ConnectivityPort, WifiAdapter};
use crate::app::ports::{IndicatorPort, SensorPort, TimePort, WatchdogPort};
use crate::drivers::indicator::Pixels;
use crate::drivers::led_strip::LedStrip;
use crate::drivers::watchdog::Watchdog;
use crate::sensors::SensorHub;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P, D, I, H> {
    sensor_hub: SensorHub<P, D, I, H>,
    strip: LedStrip,
    time: Esp32TimeAdapter,
    watchdog: Watchdog,
    wifi: WifiAdapter,
}

impl<P, D, I, H> HardwareAdapter<P, D, I, H>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    I: I2c,
    H: InputPin,
{
    pub fn new(
        sensor_hub: SensorHub<P, D, I, H>,
        strip: LedStrip,
        time: Esp32TimeAdapter,
        watchdog: Watchdog,
        wifi: WifiAdapter,
    ) -> Self {
        Self {
            sensor_hub,
            strip,
            time,
            watchdog,
            wifi,
        }
    }

    /// Service the WiFi reconnect state machine.
    pub fn poll_link(&mut self) {
        let now = self.time.uptime_ms();
        self.wifi.poll(now);
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P, D, I, H> SensorPort for HardwareAdapter<P, D, I, H>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    I: I2c,
    H: InputPin,
{
    fn read_temperature_c(&mut self) -> f32 {
        self.sensor_hub.read_temperature_c()
    }

    fn read_humidity_pct(&mut self) -> f32 {
        self.sensor_hub.read_humidity_pct()
    }

    fn read_uv_index(&mut self) -> f32 {
        self.sensor_hub.read_uv_index()
    }

    fn read_pulse_level(&mut self) -> bool {
        self.sensor_hub.read_pulse_level()
    }

    fn read_signal_strength_dbm(&mut self) -> f32 {
        self.wifi.rssi().map_or(f32::NAN, f32::from)
    }
}

// ── IndicatorPort / TimePort / WatchdogPort ───────────────────

impl<P, D, I, H> IndicatorPort for HardwareAdapter<P, D, I, H> {
    fn show(&mut self, pixels: &Pixels) {
        self.strip.write(pixels);
    }
}

impl<P, D, I, H> TimePort for HardwareAdapter<P, D, I, H> {
    fn uptime_ms(&self) -> u64 {
        self.time.uptime_ms()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.time.delay_ms(ms);
    }
}

impl<P, D, I, H> WatchdogPort for HardwareAdapter<P, D, I, H> {
    fn feed(&self) {
        self.watchdog.feed();
    }
}
