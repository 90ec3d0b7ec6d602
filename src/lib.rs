//! WeatherNode firmware library.
//!
//! Exposes the pure-logic modules for integration testing and the
//! ESP-IDF binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod bridge;
pub mod config;
pub mod fsm;
pub mod severity;

pub mod error;
pub mod pins;

// Hardware- and network-facing modules; each carries a host simulation
// behind its cfg gates so the crate builds and tests off-target.
pub mod adapters;
pub mod drivers;
pub mod sensors;
