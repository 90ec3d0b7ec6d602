//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements            | Connects to                 |
//! |---------------|-----------------------|-----------------------------|
//! | `hardware`    | SensorPort            | DHT22, VEML6075, hall GPIO  |
//! |               | IndicatorPort         | WS2812B strip (RMT)         |
//! |               | TimePort, WatchdogPort| system timer, TWDT          |
//! | `http`        | HttpPort              | esp-idf HTTP client / ureq  |
//! | `weather_api` | ConditionCodeSource   | weatherapi.com              |
//! | `log_sink`    | TelemetrySink         | Serial log output           |
//! |               | EventSink             |                             |
//! | `time`        | TimePort              | ESP32 system timer          |
//! | `wifi`        | ConnectivityPort      | ESP-IDF WiFi STA            |

pub mod device_id;
pub mod hardware;
pub mod http;
pub mod log_sink;
pub mod time;
pub mod weather_api;
pub mod wifi;
