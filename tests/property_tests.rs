//! Property tests for the pure reduction and classification logic.
//!
//! Runs on host (x86_64) only; proptest is not available for ESP32 targets.
//! On ESP32, these tests are compiled out.

#![cfg(not(target_os = "espidf"))]

use proptest::prelude::*;
use weathernode::bridge::{parse_group_power, write_rejected};
use weathernode::config::{BridgeConfig, IndicatorConfig};
use weathernode::drivers::indicator::{sequence_for, MAX_FRAMES};
use weathernode::sensors::anemometer::{AnemometerCalibration, PulseWindowSample};
use weathernode::sensors::dht22::decode_frame;
use weathernode::sensors::veml6075::RawUv;
use weathernode::severity::{SeverityClassifier, SeverityLevel};

fn calibration() -> AnemometerCalibration {
    AnemometerCalibration {
        slope: 0.075_153_53,
        intercept: 0.035_938_82,
    }
}

// ── Classification ────────────────────────────────────────────

proptest! {
    /// Every i32 classifies; only precipitation and storm codes power the
    /// bridge, and they always carry a colour.
    #[test]
    fn classify_is_total_and_consistent(code in any::<i32>()) {
        let intent = SeverityClassifier::from_config(&BridgeConfig::default()).classify(code);
        prop_assert_eq!(intent.desired_bridge_power, intent.level != SeverityLevel::Clear);
        prop_assert_eq!(intent.desired_bridge_color.is_some(), intent.desired_bridge_power);
    }

    /// Codes outside the weather table's 1000..=1282 band are always clear.
    #[test]
    fn out_of_band_codes_are_clear(code in prop_oneof![i32::MIN..1000, 1283..=i32::MAX]) {
        let intent = SeverityClassifier::default().classify(code);
        prop_assert_eq!(intent.level, SeverityLevel::Clear);
    }
}

// ── Anemometer reduction ──────────────────────────────────────

proptest! {
    #[test]
    fn rpm_is_monotonic_in_pulse_count(
        count in 0u32..10_000,
        extra in 1u32..1_000,
        window in 1u32..120_000,
    ) {
        let lo = PulseWindowSample::new(count, window).unwrap().rpm();
        let hi = PulseWindowSample::new(count + extra, window).unwrap().rpm();
        prop_assert!(hi >= lo);
    }

    #[test]
    fn zero_pulses_is_calm_for_any_window(window in 1u32..=u32::MAX) {
        let reading = PulseWindowSample::new(0, window).unwrap().reduce(&calibration());
        prop_assert_eq!(reading.rotations_per_minute, 0);
        prop_assert_eq!(reading.speed_kmh, 0.0);
    }

    #[test]
    fn speed_is_never_negative(
        count in any::<u32>(),
        window in 1u32..=u32::MAX,
        intercept in -50.0f32..50.0,
    ) {
        let cal = AnemometerCalibration { intercept, ..calibration() };
        let reading = PulseWindowSample::new(count, window).unwrap().reduce(&cal);
        prop_assert!(reading.speed_kmh >= 0.0);
    }
}

// ── Indicator sequences ───────────────────────────────────────

proptest! {
    #[test]
    fn sequences_fit_the_frame_buffer(
        level in prop_oneof![
            Just(SeverityLevel::Clear),
            Just(SeverityLevel::LightPrecipitation),
            Just(SeverityLevel::ModeratePrecipitation),
            Just(SeverityLevel::HeavyPrecipitation),
            Just(SeverityLevel::Storm),
        ],
        step in 0u32..5_000,
        pause in 0u32..5_000,
        flash in 0u32..5_000,
    ) {
        let cfg = IndicatorConfig {
            wave_step_ms: step,
            wave_pause_ms: pause,
            storm_flash_hold_ms: flash,
        };
        let seq = sequence_for(level, &cfg);
        prop_assert!(seq.len() <= MAX_FRAMES);
        prop_assert_eq!(seq.is_empty(), level == SeverityLevel::Clear);
    }
}

// ── Decoders on arbitrary input ───────────────────────────────

proptest! {
    #[test]
    fn dht22_decode_never_panics(frame in any::<[u8; 5]>()) {
        if let Ok(r) = decode_frame(&frame) {
            prop_assert!(r.humidity_pct >= 0.0);
            prop_assert!(r.temperature_c.abs() <= 3_276.7);
        }
    }

    #[test]
    fn dht22_valid_checksum_always_decodes(data in any::<[u8; 4]>()) {
        let sum = data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        let frame = [data[0], data[1], data[2], data[3], sum];
        prop_assert!(decode_frame(&frame).is_ok());
    }

    #[test]
    fn uv_index_is_never_negative(uva in any::<u16>(), uvb in any::<u16>(), comp1 in any::<u16>(), comp2 in any::<u16>()) {
        let uvi = RawUv { uva, uvb, comp1, comp2 }.uv_index();
        prop_assert!(uvi >= 0.0);
    }

    #[test]
    fn bridge_bodies_never_panic(body in ".{0,256}") {
        let _ = parse_group_power(&body);
        let _ = write_rejected(&body);
    }
}
