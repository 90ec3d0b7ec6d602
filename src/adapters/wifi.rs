//! WiFi uplink in station mode.
//!
//! The node has one uplink. The bridge and weather requests ride on it and
//! its RSSI is the published signal-strength reading, so the only things
//! the rest of the crate asks of it are: associate once at boot, keep
//! trying in the background, report RSSI.
//!
//! On ESP-IDF the adapter drives a `BlockingWifi<EspWifi>` handed in from
//! `main.rs`; elsewhere association is simulated.
//!
//! A lost or failed association is retried from [`WifiAdapter::poll`],
//! called once per control cycle, after 2 s, 4 s, 8 s ... up to 60 s.

use core::fmt;
use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    AssociationFailed,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NoCredentials => "no WiFi credentials configured",
            Self::InvalidSsid => "SSID must be 1-32 printable ASCII bytes",
            Self::InvalidPassword => "password must be empty or 8-64 printable ASCII bytes",
            Self::AssociationFailed => "could not associate with the access point",
        })
    }
}

/// What the node needs from its uplink.
pub trait ConnectivityPort {
    /// Associate now. Succeeds immediately if already up.
    fn connect(&mut self) -> Result<(), LinkError>;
    /// Drive the retry schedule; `now_ms` is monotonic uptime.
    fn poll(&mut self, now_ms: u64);
    /// Last RSSI sampled while up.
    fn rssi(&self) -> Option<i8>;
}

// ── Credentials ───────────────────────────────────────────────

fn printable(s: &str) -> bool {
    s.bytes().all(|b| (b' '..=b'~').contains(&b))
}

pub fn validate_ssid(ssid: &str) -> Result<(), LinkError> {
    if (1..=32).contains(&ssid.len()) && printable(ssid) {
        Ok(())
    } else {
        Err(LinkError::InvalidSsid)
    }
}

/// Empty means an open network.
pub fn validate_password(password: &str) -> Result<(), LinkError> {
    if password.is_empty() || ((8..=64).contains(&password.len()) && printable(password)) {
        Ok(())
    } else {
        Err(LinkError::InvalidPassword)
    }
}

// ── Retry schedule ────────────────────────────────────────────

const FIRST_RETRY_SECS: u32 = 2;
const MAX_RETRY_SECS: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Backoff {
    due_ms: u64,
    wait_secs: u32,
}

impl Backoff {
    const fn fresh() -> Self {
        Self {
            due_ms: 0,
            wait_secs: FIRST_RETRY_SECS,
        }
    }

    fn due(&self, now_ms: u64) -> bool {
        now_ms >= self.due_ms
    }

    /// Schedule the next attempt and double the wait for the one after.
    fn defer(&mut self, now_ms: u64) {
        self.due_ms = now_ms + u64::from(self.wait_secs) * 1_000;
        self.wait_secs = (self.wait_secs * 2).min(MAX_RETRY_SECS);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Down,
    Up,
    Retrying { attempt: u32 },
}

// ── Adapter ───────────────────────────────────────────────────

pub struct WifiAdapter {
    link: Link,
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    backoff: Backoff,
    rssi: Option<i8>,
    #[cfg(target_os = "espidf")]
    driver: Option<BlockingWifi<EspWifi<'static>>>,
    /// Simulated association failures still to hand out.
    #[cfg(not(target_os = "espidf"))]
    refusals: u32,
}

impl Default for WifiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl WifiAdapter {
    pub fn new() -> Self {
        Self {
            link: Link::Down,
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            backoff: Backoff::fresh(),
            rssi: None,
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            refusals: 0,
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn with_driver(mut self, driver: BlockingWifi<EspWifi<'static>>) -> Self {
        self.driver = Some(driver);
        self
    }

    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), LinkError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid = heapless::String::try_from(ssid).map_err(|_| LinkError::InvalidSsid)?;
        self.password =
            heapless::String::try_from(password).map_err(|_| LinkError::InvalidPassword)?;
        Ok(())
    }

    fn attempt(&mut self, now_ms: u64, attempt: u32) -> Result<(), LinkError> {
        match self.associate() {
            Ok(()) => {
                self.link = Link::Up;
                self.backoff = Backoff::fresh();
                self.rssi = self.sample_rssi();
                info!("WiFi: up on '{}' (RSSI {:?})", self.ssid, self.rssi);
                Ok(())
            }
            Err(e) => {
                self.backoff.defer(now_ms);
                self.link = Link::Retrying { attempt };
                warn!(
                    "WiFi: attempt {} failed ({}), next in {} ms",
                    attempt,
                    e,
                    self.backoff.due_ms.saturating_sub(now_ms)
                );
                Err(e)
            }
        }
    }

    // ── Platform ──────────────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn associate(&mut self) -> Result<(), LinkError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let Some(wifi) = self.driver.as_mut() else {
            return Err(LinkError::AssociationFailed);
        };
        let cfg = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.clone(),
            password: self.password.clone(),
            auth_method: if self.password.is_empty() {
                AuthMethod::None
            } else {
                AuthMethod::WPA2Personal
            },
            ..Default::default()
        });
        let fail = |what: &str, e: esp_idf_svc::sys::EspError| {
            warn!("WiFi: {} failed: {}", what, e);
            LinkError::AssociationFailed
        };
        wifi.set_configuration(&cfg).map_err(|e| fail("configure", e))?;
        if !wifi.is_started().unwrap_or(false) {
            wifi.start().map_err(|e| fail("start", e))?;
        }
        wifi.connect().map_err(|e| fail("connect", e))?;
        wifi.wait_netif_up().map_err(|e| fail("DHCP", e))
    }

    #[cfg(not(target_os = "espidf"))]
    fn associate(&mut self) -> Result<(), LinkError> {
        if self.refusals > 0 {
            self.refusals -= 1;
            return Err(LinkError::AssociationFailed);
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn still_associated(&self) -> bool {
        self.driver
            .as_ref()
            .and_then(|w| w.is_connected().ok())
            .unwrap_or(false)
    }

    #[cfg(not(target_os = "espidf"))]
    fn still_associated(&self) -> bool {
        self.link == Link::Up
    }

    #[cfg(target_os = "espidf")]
    fn sample_rssi(&self) -> Option<i8> {
        use esp_idf_svc::sys::{ESP_OK, esp_wifi_sta_get_ap_info, wifi_ap_record_t};

        let mut ap: wifi_ap_record_t = unsafe { core::mem::zeroed() };
        let ret = unsafe { esp_wifi_sta_get_ap_info(&mut ap) };
        (ret == ESP_OK as i32).then_some(ap.rssi)
    }

    #[cfg(not(target_os = "espidf"))]
    fn sample_rssi(&self) -> Option<i8> {
        Some(-60)
    }
}

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), LinkError> {
        if self.ssid.is_empty() {
            return Err(LinkError::NoCredentials);
        }
        if self.link == Link::Up {
            return Ok(());
        }
        self.attempt(0, 0)
    }

    fn poll(&mut self, now_ms: u64) {
        match self.link {
            Link::Up if self.still_associated() => self.rssi = self.sample_rssi(),
            Link::Up => {
                warn!("WiFi: association lost");
                self.rssi = None;
                self.backoff = Backoff::fresh();
                self.link = Link::Retrying { attempt: 0 };
            }
            Link::Retrying { attempt } if self.backoff.due(now_ms) => {
                let _ = self.attempt(now_ms, attempt + 1);
            }
            Link::Retrying { .. } | Link::Down => {}
        }
    }

    fn rssi(&self) -> Option<i8> {
        self.rssi
    }
}
