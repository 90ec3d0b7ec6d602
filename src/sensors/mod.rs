//! Sensor subsystem: individual drivers and the aggregating [`SensorHub`].
//!
//! The hub owns the DHT22, the VEML6075 and the anemometer's hall input and
//! answers the raw-reading half of [`SensorPort`](crate::app::ports::SensorPort).
//! Analog reads never fail outward: a driver error is logged and reported
//! as `f32::NAN`, which the control loop skips for that cycle.

pub mod anemometer;
pub mod dht22;
pub mod veml6075;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::i2c::I2c;
use log::debug;

use dht22::{Dht22, Dht22Reading};
use veml6075::Veml6075;

use crate::error::SensorError;

/// Aggregates all sensor drivers.
///
/// Temperature and humidity come from the same DHT22 frame: reading the
/// temperature fetches a fresh frame, reading humidity consumes it (or
/// fetches one if none is pending).
pub struct SensorHub<P, D, I, H> {
    dht: Dht22<P, D>,
    uv: Option<Veml6075<I>>,
    hall: H,
    pending: Option<Result<Dht22Reading, SensorError>>,
}

impl<P, D, I, H> SensorHub<P, D, I, H>
where
    P: InputPin + OutputPin,
    D: DelayNs,
    I: I2c,
    H: InputPin,
{
    /// `uv` is `None` when the VEML6075 was not detected at boot; UV then
    /// reads NaN every cycle.
    pub fn new(dht: Dht22<P, D>, uv: Option<Veml6075<I>>, hall: H) -> Self {
        Self {
            dht,
            uv,
            hall,
            pending: None,
        }
    }

    fn fresh_frame(&mut self) -> Result<Dht22Reading, SensorError> {
        let r = self.dht.read();
        if let Err(e) = r {
            debug!("DHT22: {}", e);
        }
        r
    }

    pub fn read_temperature_c(&mut self) -> f32 {
        let frame = self.fresh_frame();
        self.pending = Some(frame);
        frame.map_or(f32::NAN, |r| r.temperature_c)
    }

    pub fn read_humidity_pct(&mut self) -> f32 {
        let frame = match self.pending.take() {
            Some(frame) => frame,
            None => self.fresh_frame(),
        };
        frame.map_or(f32::NAN, |r| r.humidity_pct)
    }

    pub fn read_uv_index(&mut self) -> f32 {
        let Some(uv) = self.uv.as_mut() else {
            return f32::NAN;
        };
        uv.read_uv_index().unwrap_or_else(|e| {
            debug!("VEML6075: {}", e);
            f32::NAN
        })
    }

    /// Instantaneous hall level; a pin error reads as low (no pulse).
    pub fn read_pulse_level(&mut self) -> bool {
        self.hall.is_high().unwrap_or(false)
    }
}
