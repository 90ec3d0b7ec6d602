//! WeatherNode Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        HttpClient ×2      LogTelemetrySink    │
//! │  (Sensor+Indicator+     (bridge, weather)  (Telemetry+Event)   │
//! │   Time+Watchdog)        WifiAdapter                            │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              ControlLoop (pure logic)                  │    │
//! │  │  CycleFsm · PulseRateMeter · Classifier · Bridge       │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;
use esp_idf_hal::rmt::TxRmtDriver;
use esp_idf_hal::rmt::config::TransmitConfig;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use weathernode::adapters::device_id::{self, StationIdentity};
use weathernode::adapters::hardware::HardwareAdapter;
use weathernode::adapters::http::HttpClient;
use weathernode::adapters::log_sink::LogTelemetrySink;
use weathernode::adapters::time::Esp32TimeAdapter;
use weathernode::adapters::weather_api::ConfiguredSource;
use weathernode::adapters::wifi::{ConnectivityPort, WifiAdapter};
use weathernode::app::service::ControlLoop;
use weathernode::config::SystemConfig;
use weathernode::drivers::led_strip::LedStrip;
use weathernode::drivers::watchdog::Watchdog;
use weathernode::pins;
use weathernode::sensors::SensorHub;
use weathernode::sensors::dht22::Dht22;
use weathernode::sensors::veml6075::Veml6075;

/// Build-time JSON override, e.g.
/// `WEATHERNODE_CONFIG='{"bridge":{"host":"192.168.1.2","username":"…"}}'`.
const CONFIG_JSON: Option<&str> = option_env!("WEATHERNODE_CONFIG");

fn load_config() -> SystemConfig {
    let Some(json) = CONFIG_JSON else {
        info!("Config: built-in defaults");
        return SystemConfig::default();
    };
    match SystemConfig::from_json(json) {
        Ok(cfg) => {
            info!("Config: loaded from WEATHERNODE_CONFIG");
            cfg
        }
        Err(e) => {
            warn!("Config: {}, falling back to defaults", e);
            SystemConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  WeatherNode v{}                     ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = load_config();
    let identity = StationIdentity::from_mac(device_id::read_mac());
    let station_id = identity.unique_id().clone();
    info!("Station: {} ({})", station_id, identity.hostname());

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let watchdog = Watchdog::new(config.timing.watchdog_timeout_ms);

    // ── 2. Sensors ────────────────────────────────────────────
    info!(
        "Pins: DHT22={} hall={} I2C={}/{} strip={}",
        pins::DHT22_DATA_GPIO,
        pins::ANEMOMETER_HALL_GPIO,
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::LED_STRIP_GPIO
    );
    let dht = Dht22::new(PinDriver::input_output_od(peripherals.pins.gpio13)?, Ets);
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio21,
        peripherals.pins.gpio22,
        &I2cConfig::new().baudrate(pins::I2C_FREQ_HZ.Hz()),
    )?;
    let uv = match Veml6075::new(i2c) {
        Ok(dev) => Some(dev),
        Err(e) => {
            error!("VEML6075 not found ({}), UV index disabled", e);
            None
        }
    };
    let hall = PinDriver::input(peripherals.pins.gpio12)?;
    let hub = SensorHub::new(dht, uv, hall);

    // ── 3. Indicator strip ────────────────────────────────────
    let tx = TxRmtDriver::new(
        peripherals.rmt.channel0,
        peripherals.pins.gpio14,
        &TransmitConfig::new().clock_divider(1),
    )?;
    let strip = LedStrip::new(tx);

    // ── 4. WiFi ───────────────────────────────────────────────
    let mut esp_wifi = EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?;
    if let Err(e) = esp_wifi.sta_netif_mut().set_hostname(identity.hostname()) {
        warn!("WiFi: hostname '{}' rejected ({})", identity.hostname(), e);
    }
    let mut wifi = WifiAdapter::new().with_driver(BlockingWifi::wrap(esp_wifi, sysloop)?);
    match wifi.set_credentials(&config.wifi.ssid, &config.wifi.password) {
        Ok(()) => {
            if let Err(e) = wifi.connect() {
                warn!("WiFi: initial connect failed ({}), retrying in background", e);
            }
        }
        Err(e) => warn!("WiFi: {}; running offline", e),
    }

    // ── 5. Assemble the control loop ──────────────────────────
    let node = HardwareAdapter::new(hub, strip, Esp32TimeAdapter::new(), watchdog, wifi);
    let timeout = config.timing.http_timeout_ms;
    let conditions =
        ConfiguredSource::from_config(HttpClient::new(timeout), &config.weather, &config.station);
    let sink = LogTelemetrySink::new(station_id.clone());

    let mut control = ControlLoop::new(
        config,
        station_id,
        node,
        HttpClient::new(timeout),
        conditions,
        sink,
    );
    control.start();

    // ── 6. Run ────────────────────────────────────────────────
    loop {
        control.node_mut().poll_link();
        control.run_one_cycle();
    }
}
