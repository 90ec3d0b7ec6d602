//! DHT22 / AM2302 temperature and humidity sensor.
//!
//! Single-wire protocol over an open-drain GPIO:
//!
//! 1. host pulls the line low for ≥ 1 ms, releases it,
//! 2. sensor answers 80 µs low + 80 µs high,
//! 3. sensor sends 40 bits, each a ~50 µs low followed by a high pulse of
//!    ~27 µs (`0`) or ~70 µs (`1`).
//!
//! The 5 bytes are humidity (×10), temperature (×10, sign in bit 15) and
//! an 8-bit additive checksum.  The sensor needs ≥ 2 s between reads.
//!
//! Generic over `embedded-hal` 1.0 pin and delay traits, so the decoder is
//! testable on the host and the ESP-IDF build plugs in
//! `PinDriver::input_output_od` plus `Ets`.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

use crate::error::SensorError;

/// Longest wait for any single level change (µs).
const EDGE_TIMEOUT_US: u32 = 100;
/// High pulses longer than this are `1` bits (µs).
const ONE_THRESHOLD_US: u32 = 40;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dht22Reading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Decode a raw 5-byte frame.
pub fn decode_frame(frame: &[u8; 5]) -> Result<Dht22Reading, SensorError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(SensorError::ChecksumMismatch);
    }
    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let mut temperature_c = f32::from(magnitude) / 10.0;
    if frame[2] & 0x80 != 0 {
        temperature_c = -temperature_c;
    }
    Ok(Dht22Reading {
        temperature_c,
        humidity_pct: f32::from(humidity) / 10.0,
    })
}

pub struct Dht22<P, D> {
    pin: P,
    delay: D,
}

impl<P, D> Dht22<P, D>
where
    P: InputPin + OutputPin,
    D: DelayNs,
{
    pub fn new(mut pin: P, delay: D) -> Self {
        // Idle high so the first start pulse is a clean falling edge.
        let _ = pin.set_high();
        Self { pin, delay }
    }

    pub fn read(&mut self) -> Result<Dht22Reading, SensorError> {
        let frame = self.read_frame()?;
        decode_frame(&frame)
    }

    fn read_frame(&mut self) -> Result<[u8; 5], SensorError> {
        self.pin.set_low().map_err(|_| SensorError::BusError)?;
        self.delay.delay_us(1_100);
        self.pin.set_high().map_err(|_| SensorError::BusError)?;
        self.delay.delay_us(30);

        // Response preamble.
        self.wait_while(true)?;
        self.wait_while(false)?;
        self.wait_while(true)?;

        let mut frame = [0u8; 5];
        for bit in 0..40 {
            self.wait_while(false)?;
            let high_us = self.wait_while(true)?;
            if high_us > ONE_THRESHOLD_US {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(frame)
    }

    /// Spin while the line is at `level`; returns the time spent in µs.
    fn wait_while(&mut self, level: bool) -> Result<u32, SensorError> {
        let mut elapsed = 0;
        while self.pin.is_high().map_err(|_| SensorError::BusError)? == level {
            if elapsed >= EDGE_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
            self.delay.delay_us(1);
            elapsed += 1;
        }
        Ok(elapsed)
    }
}
