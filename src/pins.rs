//! GPIO / peripheral pin assignments for the weather node board.
//!
//! `esp-idf-hal` hands out pins as distinct types, so `main.rs` names them
//! directly (`gpio13`, `gpio12`, ...) and only logs these numbers at
//! start-up.  Changing a pin means changing both places.

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT22 single-wire data line (open-drain, external 10 kΩ pull-up).
pub const DHT22_DATA_GPIO: i32 = 13;

/// Hall-effect switch on the anemometer rotor.  HIGH while the magnet
/// passes.
pub const ANEMOMETER_HALL_GPIO: i32 = 12;

/// VEML6075 UV sensor on I²C0.
pub const I2C_SDA_GPIO: i32 = 21;
pub const I2C_SCL_GPIO: i32 = 22;
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Indicator strip (WS2812B, GRB)
// ---------------------------------------------------------------------------

pub const LED_STRIP_GPIO: i32 = 14;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_pin_is_shared() {
        let pins = [
            DHT22_DATA_GPIO,
            ANEMOMETER_HALL_GPIO,
            I2C_SDA_GPIO,
            I2C_SCL_GPIO,
            LED_STRIP_GPIO,
        ];
        for (i, a) in pins.iter().enumerate() {
            assert!(pins[i + 1..].iter().all(|b| b != a), "GPIO{a} assigned twice");
        }
    }
}
