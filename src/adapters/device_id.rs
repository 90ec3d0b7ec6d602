//! Station identity from the WiFi station MAC.
//!
//! The monitoring backend keys the device and every entity on the full
//! 6-byte MAC, rendered as 12 lowercase hex digits.  The network hostname
//! only needs to be unique on the LAN and uses the last three bytes.

use core::fmt::Write;

/// Telemetry unique id: 12 hex digits of the MAC.
pub type DeviceIdString = heapless::String<16>;

/// DHCP hostname, `weathernode-xxyyzz`.
pub type HostnameString = heapless::String<24>;

pub type MacAddress = [u8; 6];

/// MAC the station interface associates with.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    use esp_idf_svc::sys::{ESP_OK, esp_mac_type_t_ESP_MAC_WIFI_STA, esp_read_mac};

    let mut mac: MacAddress = [0u8; 6];
    let ret = unsafe { esp_read_mac(mac.as_mut_ptr(), esp_mac_type_t_ESP_MAC_WIFI_STA) };
    if ret != ESP_OK as i32 {
        log::warn!("Identity: esp_read_mac returned {}", ret);
    }
    mac
}

#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0x24, 0x0A, 0xC4, 0x5E, 0x70, 0x1D]
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationIdentity {
    mac: MacAddress,
    unique_id: DeviceIdString,
    hostname: HostnameString,
}

impl StationIdentity {
    pub fn from_mac(mac: MacAddress) -> Self {
        let mut unique_id = DeviceIdString::new();
        for b in mac {
            // 12 digits always fit in 16.
            let _ = write!(unique_id, "{b:02x}");
        }
        let mut hostname = HostnameString::new();
        let _ = write!(hostname, "weathernode-{:02x}{:02x}{:02x}", mac[3], mac[4], mac[5]);
        Self {
            mac,
            unique_id,
            hostname,
        }
    }

    pub fn mac(&self) -> &MacAddress {
        &self.mac
    }

    pub fn unique_id(&self) -> &DeviceIdString {
        &self.unique_id
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }
}
