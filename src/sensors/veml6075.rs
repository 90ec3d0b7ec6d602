//! VEML6075 UVA/UVB light sensor (I²C, address 0x10).
//!
//! UV index is derived per the Vishay application note "Designing the
//! VEML6075 into an Application": raw UVA/UVB counts are compensated for
//! visible and IR leakage using the two COMP channels, scaled by the
//! per-band responsivity, and averaged.
//!
//! Registers are 16-bit little-endian.

use embedded_hal::i2c::I2c;
use log::info;

use crate::error::SensorError;

pub const ADDRESS: u8 = 0x10;

const REG_CONF: u8 = 0x00;
const REG_UVA: u8 = 0x07;
const REG_UVB: u8 = 0x09;
const REG_UVCOMP1: u8 = 0x0A;
const REG_UVCOMP2: u8 = 0x0B;
const REG_ID: u8 = 0x0C;

const DEVICE_ID: u8 = 0x26;

/// Integration time 100 ms, normal dynamic range, continuous mode, powered on.
const CONF_IT_100MS: u16 = 0x0010;

// Open-air coefficients (no diffuser).
const UVA_A_COEF: f32 = 2.22;
const UVA_B_COEF: f32 = 1.33;
const UVB_C_COEF: f32 = 2.95;
const UVB_D_COEF: f32 = 1.74;
/// UVI per count at 100 ms integration.
const UVA_RESPONSIVITY: f32 = 0.001_461;
const UVB_RESPONSIVITY: f32 = 0.002_591;

/// One set of raw channel counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawUv {
    pub uva: u16,
    pub uvb: u16,
    pub comp1: u16,
    pub comp2: u16,
}

impl RawUv {
    /// Compensated UV index, floored at zero.
    pub fn uv_index(&self) -> f32 {
        let comp1 = f32::from(self.comp1);
        let comp2 = f32::from(self.comp2);
        let uva = f32::from(self.uva) - UVA_A_COEF * comp1 - UVA_B_COEF * comp2;
        let uvb = f32::from(self.uvb) - UVB_C_COEF * comp1 - UVB_D_COEF * comp2;
        let uvi = (uva * UVA_RESPONSIVITY + uvb * UVB_RESPONSIVITY) / 2.0;
        uvi.max(0.0)
    }
}

pub struct Veml6075<I> {
    i2c: I,
}

impl<I: I2c> Veml6075<I> {
    /// Check the device id and start continuous measurement.
    pub fn new(mut i2c: I) -> Result<Self, SensorError> {
        let id = read_reg(&mut i2c, REG_ID)?;
        if (id & 0xFF) as u8 != DEVICE_ID {
            return Err(SensorError::BusError);
        }
        let [lo, hi] = CONF_IT_100MS.to_le_bytes();
        i2c.write(ADDRESS, &[REG_CONF, lo, hi])
            .map_err(|_| SensorError::BusError)?;
        info!("VEML6075: configured (IT=100ms)");
        Ok(Self { i2c })
    }

    pub fn read_raw(&mut self) -> Result<RawUv, SensorError> {
        Ok(RawUv {
            uva: read_reg(&mut self.i2c, REG_UVA)?,
            uvb: read_reg(&mut self.i2c, REG_UVB)?,
            comp1: read_reg(&mut self.i2c, REG_UVCOMP1)?,
            comp2: read_reg(&mut self.i2c, REG_UVCOMP2)?,
        })
    }

    pub fn read_uv_index(&mut self) -> Result<f32, SensorError> {
        self.read_raw().map(|raw| raw.uv_index())
    }
}

fn read_reg<I: I2c>(i2c: &mut I, reg: u8) -> Result<u16, SensorError> {
    let mut buf = [0u8; 2];
    i2c.write_read(ADDRESS, &[reg], &mut buf)
        .map_err(|_| SensorError::BusError)?;
    Ok(u16::from_le_bytes(buf))
}
