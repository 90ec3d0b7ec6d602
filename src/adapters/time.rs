//! ESP32 time adapter.
//!
//! Monotonic uptime and blocking delays for the control loop.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` for uptime and
//!   `FreeRtos::delay_ms` for sleeps (yields to the scheduler).
//! - **`not(target_os = "espidf")`**: `std::time::Instant` and
//!   `std::thread::sleep` for host-side simulation.

use crate::app::ports::TimePort;

pub struct Esp32TimeAdapter {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for Esp32TimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Esp32TimeAdapter {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic).
    #[cfg(target_os = "espidf")]
    pub fn uptime_ms(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000
    }

    /// Milliseconds since start-up (monotonic).
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    #[cfg(target_os = "espidf")]
    pub fn delay_ms(&self, ms: u32) {
        esp_idf_hal::delay::FreeRtos::delay_ms(ms);
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn delay_ms(&self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

impl TimePort for Esp32TimeAdapter {
    fn uptime_ms(&self) -> u64 {
        Esp32TimeAdapter::uptime_ms(self)
    }

    fn delay_ms(&mut self, ms: u32) {
        Esp32TimeAdapter::delay_ms(self, ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_is_monotonic_across_delay() {
        let mut t = Esp32TimeAdapter::new();
        let a = TimePort::uptime_ms(&t);
        TimePort::delay_ms(&mut t, 5);
        let b = TimePort::uptime_ms(&t);
        assert!(b >= a + 5, "{} -> {}", a, b);
    }
}
