//! WS2812B indicator strip driver.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: one RMT TX channel bit-bangs the 800 kHz WS2812 waveform.
//! On host/test: keeps the last written frame in memory.
//!
//! Colours are sent GRB, most significant bit first.  Write errors are
//! logged at debug level and otherwise ignored; the strip is cosmetic.

use crate::drivers::indicator::{INDICATOR_COUNT, Pixels};

#[cfg(target_os = "espidf")]
use esp_idf_hal::rmt::{FixedLengthSignal, PinState, Pulse, TxRmtDriver};

/// Bits per pixel on the wire.
const BITS_PER_PIXEL: usize = 24;

/// Pack one pixel into the 24-bit GRB word the strip expects.
pub fn grb_word((r, g, b): (u8, u8, u8)) -> u32 {
    (u32::from(g) << 16) | (u32::from(r) << 8) | u32::from(b)
}

pub struct LedStrip {
    #[cfg(target_os = "espidf")]
    tx: TxRmtDriver<'static>,
    last: Pixels,
    writes: u32,
}

impl LedStrip {
    #[cfg(target_os = "espidf")]
    pub fn new(tx: TxRmtDriver<'static>) -> Self {
        let mut strip = Self {
            tx,
            last: [(0, 0, 0); INDICATOR_COUNT],
            writes: 0,
        };
        strip.write(&[(0, 0, 0); INDICATOR_COUNT]);
        strip
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        log::info!("LedStrip(sim): {} pixels in memory", INDICATOR_COUNT);
        Self {
            last: [(0, 0, 0); INDICATOR_COUNT],
            writes: 0,
        }
    }

    pub fn write(&mut self, pixels: &Pixels) {
        if let Err(e) = self.platform_write(pixels) {
            log::debug!("LedStrip: write failed: {}", e);
        }
        self.last = *pixels;
        self.writes = self.writes.wrapping_add(1);
    }

    pub fn current(&self) -> &Pixels {
        &self.last
    }

    pub fn writes(&self) -> u32 {
        self.writes
    }

    #[cfg(target_os = "espidf")]
    fn platform_write(&mut self, pixels: &Pixels) -> Result<(), esp_idf_svc::sys::EspError> {
        use core::time::Duration;

        let ticks_hz = self.tx.counter_clock()?;
        let t0h = Pulse::new_with_duration(ticks_hz, PinState::High, &Duration::from_nanos(350))?;
        let t0l = Pulse::new_with_duration(ticks_hz, PinState::Low, &Duration::from_nanos(800))?;
        let t1h = Pulse::new_with_duration(ticks_hz, PinState::High, &Duration::from_nanos(700))?;
        let t1l = Pulse::new_with_duration(ticks_hz, PinState::Low, &Duration::from_nanos(600))?;

        let mut signal = FixedLengthSignal::<{ BITS_PER_PIXEL * INDICATOR_COUNT }>::new();
        for (n, &px) in pixels.iter().enumerate() {
            let word = grb_word(px);
            for bit in 0..BITS_PER_PIXEL {
                let one = word & (1 << (BITS_PER_PIXEL - 1 - bit)) != 0;
                let pair = if one { (t1h, t1l) } else { (t0h, t0l) };
                signal.set(n * BITS_PER_PIXEL + bit, &pair)?;
            }
        }
        self.tx.start_blocking(&signal)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_write(&mut self, _pixels: &Pixels) -> Result<(), core::convert::Infallible> {
        Ok(())
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for LedStrip {
    fn default() -> Self {
        Self::new()
    }
}
