//! Fuzz target: `decode_frame`
//!
//! A decoded frame's humidity is never negative and temperatures stay
//! within the 15-bit magnitude the wire format can carry.
//!
//! cargo fuzz run fuzz_dht22_frame

#![no_main]

use libfuzzer_sys::fuzz_target;
use weathernode::sensors::dht22::decode_frame;

fuzz_target!(|data: [u8; 5]| {
    if let Ok(r) = decode_frame(&data) {
        assert!(r.humidity_pct >= 0.0);
        assert!(r.temperature_c.abs() <= 3_276.7);
    }
});
