//! Integration tests: ControlLoop end-to-end against mock adapters.
//!
//! Validates that a full cycle drives sensors, classification, both
//! actuation channels and telemetry through the port boundary, and that a
//! failure in any one of them never stops the others.

use weathernode::adapters::weather_api::FixedConditionSource;
use weathernode::app::events::{AppEvent, RemoteOutcome, TelemetryField};
use weathernode::app::service::ControlLoop;
use weathernode::bridge::BridgeAction;
use weathernode::config::SystemConfig;
use weathernode::drivers::indicator::{MAX_FRAMES, OFF, STORM};
use weathernode::error::{ActuationError, TransportError};
use weathernode::fsm::CyclePhase;
use weathernode::severity::SeverityLevel;

use super::mock_node::{bridged_config, station_id, MockBridge, MockNode, RecordingSink};

type TestLoop = ControlLoop<MockNode, MockBridge, FixedConditionSource, RecordingSink>;

fn make_loop(config: SystemConfig, node: MockNode, bridge: MockBridge, code: i32) -> TestLoop {
    ControlLoop::new(
        config,
        station_id(),
        node,
        bridge,
        FixedConditionSource(code),
        RecordingSink::default(),
    )
}

fn bridge(ctl: &TestLoop) -> &MockBridge {
    ctl.bridge_http().expect("bridge configured")
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn start_announces_station_and_coordinates() {
    let mut cfg = bridged_config();
    cfg.station.owner = "Sam".into();
    let mut ctl = make_loop(cfg, MockNode::new(), MockBridge::new(false), 1000);
    ctl.start();

    let sink = ctl.sink();
    let AppEvent::Started(info) = &sink.events[0] else {
        panic!("first event was {:?}", sink.events[0]);
    };
    assert_eq!(info.unique_id.as_str(), "240ac45e701d");
    assert_eq!(info.name, "Home Station");
    assert_eq!(info.owner, "Sam");
    assert_eq!(info.model, "WeatherNode ESP32");
    assert_eq!(info.software_version, env!("CARGO_PKG_VERSION"));
    let station = &ctl.config().station;
    assert_eq!(sink.value_of(TelemetryField::Latitude), Some(station.latitude));
    assert_eq!(sink.value_of(TelemetryField::Longitude), Some(station.longitude));
    assert_eq!(ctl.cycle_count(), 0);
}

// ── Cycle structure ───────────────────────────────────────────

#[test]
fn cycle_returns_to_idle_and_counts() {
    let mut ctl = make_loop(SystemConfig::default(), MockNode::new(), MockBridge::new(false), 1000);

    let first = ctl.run_one_cycle();
    let second = ctl.run_one_cycle();

    assert_eq!(first.cycle, 1);
    assert_eq!(second.cycle, 2);
    assert_eq!(ctl.cycle_count(), 2);
    assert_eq!(ctl.current_phase(), CyclePhase::Idle);
    let completed = ctl
        .sink()
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::CycleCompleted(_)))
        .count();
    assert_eq!(completed, 2);
}

#[test]
fn cycle_blocks_for_delay_and_window() {
    let cfg = SystemConfig::default();
    let floor = u64::from(cfg.timing.inter_cycle_delay_ms) + u64::from(cfg.anemometer.window_ms);
    let mut ctl = make_loop(cfg, MockNode::new(), MockBridge::new(false), 1000);

    let report = ctl.run_one_cycle();
    assert!(report.duration_ms >= floor, "{} < {}", report.duration_ms, floor);
    // Feeds during the idle pause, the window and after every phase.
    assert!(ctl.node().feeds.get() >= 5 + 10 + 7);
}

#[test]
fn watchdog_never_starves_through_slow_bridge_and_long_playback() {
    let mut cfg = bridged_config();
    cfg.indicator.wave_pause_ms = 6_000;
    cfg.timing.http_timeout_ms = 10_000;
    assert!(cfg.validate().is_ok());

    let node = MockNode::new();
    // GET and PUT each take the full timeout.
    let bridge = MockBridge::slow(false, &node, 10_000);
    let mut ctl = make_loop(cfg.clone(), node, bridge, 1195);
    let report = ctl.run_one_cycle();

    assert_eq!(report.remote, RemoteOutcome::Applied(BridgeAction::Switched { on: true }));
    let gap = ctl.node().max_feed_gap_ms();
    assert!(gap <= u64::from(cfg.longest_unfed_ms()) + 5, "gap {gap} ms");
    assert!(gap < u64::from(cfg.timing.watchdog_timeout_ms));
}

// ── Measurements and telemetry ────────────────────────────────

#[test]
fn all_valid_readings_published_in_order() {
    let mut ctl = make_loop(SystemConfig::default(), MockNode::new(), MockBridge::new(false), 1000);
    let report = ctl.run_one_cycle();

    assert_eq!(report.published, 5);
    assert_eq!(
        ctl.sink().fields(),
        vec![
            TelemetryField::Temperature,
            TelemetryField::Humidity,
            TelemetryField::UvIndex,
            TelemetryField::WindSpeed,
            TelemetryField::SignalStrength,
        ]
    );
    assert_eq!(ctl.sink().value_of(TelemetryField::Temperature), Some(18.5));
}

#[test]
fn failed_temperature_read_skips_only_that_field() {
    let mut node = MockNode::new();
    node.temperature_c = f32::NAN;
    node.signal_dbm = f32::NAN;
    let mut ctl = make_loop(SystemConfig::default(), node, MockBridge::new(false), 1000);

    let report = ctl.run_one_cycle();

    assert_eq!(report.measurements.temperature_c, None);
    assert_eq!(report.published, 3);
    assert_eq!(
        ctl.sink().fields(),
        vec![TelemetryField::Humidity, TelemetryField::UvIndex, TelemetryField::WindSpeed]
    );
    assert!(matches!(
        ctl.sink().events.last(),
        Some(AppEvent::CycleCompleted(_))
    ));
}

#[test]
fn implausible_humidity_is_dropped() {
    let mut node = MockNode::new();
    node.humidity_pct = 150.0;
    let mut ctl = make_loop(SystemConfig::default(), node, MockBridge::new(false), 1000);

    let report = ctl.run_one_cycle();
    assert_eq!(report.measurements.humidity_pct, None);
    assert!(!ctl.sink().fields().contains(&TelemetryField::Humidity));
}

#[test]
fn one_hertz_rotor_reads_about_sixty_rpm() {
    let mut node = MockNode::new();
    node.pulse_period_ms = 1_000;
    let mut ctl = make_loop(SystemConfig::default(), node, MockBridge::new(false), 1000);

    let wind = ctl.run_one_cycle().measurements.wind;
    // Window phase decides whether the first or last edge falls inside.
    assert!(
        (54..=60).contains(&wind.rotations_per_minute),
        "{}",
        wind.rotations_per_minute
    );
    assert!(wind.speed_kmh > 4.0 && wind.speed_kmh < 4.6, "{}", wind.speed_kmh);
}

#[test]
fn still_rotor_publishes_zero_wind() {
    let mut ctl = make_loop(SystemConfig::default(), MockNode::new(), MockBridge::new(false), 1000);
    let report = ctl.run_one_cycle();

    assert_eq!(report.measurements.wind.rotations_per_minute, 0);
    assert_eq!(ctl.sink().value_of(TelemetryField::WindSpeed), Some(0.0));
}

// ── Classification and actuation ──────────────────────────────

#[test]
fn heavy_rain_plays_three_waves_and_switches_bridge_on() {
    let mut ctl = make_loop(bridged_config(), MockNode::new(), MockBridge::new(false), 1195);
    let report = ctl.run_one_cycle();

    assert_eq!(report.condition_code, 1195);
    assert_eq!(report.intent.level, SeverityLevel::HeavyPrecipitation);
    assert_eq!(ctl.node().frames.len(), MAX_FRAMES);
    assert_eq!(report.remote, RemoteOutcome::Applied(BridgeAction::Switched { on: true }));

    let b = bridge(&ctl);
    assert_eq!(b.puts.len(), 1);
    assert!(b.puts[0].0.ends_with("/groups/5/action"), "{}", b.puts[0].0);
    assert_eq!(b.puts[0].1, r#"{"on":true,"hue":41202,"effect":"none"}"#);
    assert!(ctl
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::BridgeSwitched { on: true })));
}

#[test]
fn storm_flashes_each_indicator_once() {
    let mut ctl = make_loop(bridged_config(), MockNode::new(), MockBridge::new(false), 1087);
    let report = ctl.run_one_cycle();

    assert_eq!(report.intent.level, SeverityLevel::Storm);
    let frames = &ctl.node().frames;
    let flashes: Vec<_> = frames.iter().filter(|f| f.contains(&STORM)).collect();
    assert_eq!(flashes.len(), 6);
    assert!(frames.last().is_some_and(|f| f.iter().all(|p| *p == OFF)));
    assert!(bridge(&ctl).puts[0].1.contains(r#""hue":9493"#));
}

#[test]
fn unchanged_intent_puts_only_once() {
    let mut ctl = make_loop(bridged_config(), MockNode::new(), MockBridge::new(false), 1183);

    let first = ctl.run_one_cycle();
    let second = ctl.run_one_cycle();

    assert_eq!(first.remote, RemoteOutcome::Applied(BridgeAction::Switched { on: true }));
    assert_eq!(second.remote, RemoteOutcome::Applied(BridgeAction::Unchanged));
    let b = bridge(&ctl);
    assert_eq!(b.gets, 2);
    assert_eq!(b.puts.len(), 1);
}

#[test]
fn clear_weather_switches_lit_group_off_without_indicator() {
    let mut ctl = make_loop(bridged_config(), MockNode::new(), MockBridge::new(true), 1000);
    let report = ctl.run_one_cycle();

    assert_eq!(report.intent.level, SeverityLevel::Clear);
    assert!(ctl.node().frames.is_empty());
    assert_eq!(report.remote, RemoteOutcome::Applied(BridgeAction::Switched { on: false }));
    assert_eq!(bridge(&ctl).puts[0].1, r#"{"on":false}"#);
}

#[test]
fn unknown_condition_is_clear() {
    let mut ctl = make_loop(bridged_config(), MockNode::new(), MockBridge::new(false), -1);
    let report = ctl.run_one_cycle();

    assert_eq!(report.intent.level, SeverityLevel::Clear);
    assert_eq!(report.remote, RemoteOutcome::Applied(BridgeAction::Unchanged));
    assert!(bridge(&ctl).puts.is_empty());
}

#[test]
fn unreachable_bridge_does_not_block_indicator_or_telemetry() {
    let mut ctl = make_loop(bridged_config(), MockNode::new(), MockBridge::unreachable(), 1189);
    let report = ctl.run_one_cycle();

    let err = ActuationError::Transport(TransportError::Connect);
    assert_eq!(report.remote, RemoteOutcome::Failed(err));
    assert_eq!(ctl.node().frames.len(), 12);
    assert_eq!(report.published, 5);
    // GET failed, so no PUT was attempted.
    assert!(bridge(&ctl).puts.is_empty());
    assert!(ctl
        .sink()
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::BridgeFailed(e) if *e == err)));

    // Next cycle still runs normally.
    assert_eq!(ctl.run_one_cycle().cycle, 2);
}

#[test]
fn unconfigured_bridge_is_skipped() {
    let mut ctl = make_loop(SystemConfig::default(), MockNode::new(), MockBridge::new(false), 1195);
    let report = ctl.run_one_cycle();

    assert!(ctl.bridge_http().is_none());
    assert_eq!(report.remote, RemoteOutcome::Skipped);
    assert_eq!(ctl.node().frames.len(), MAX_FRAMES);
}
