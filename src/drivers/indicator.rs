//! Weather indicator sequences for the six-pixel strip.
//!
//! Planning and playback are split: [`sequence_for`] turns a
//! [`SeverityLevel`] into a fixed-capacity list of [`Frame`]s (pure, no
//! I/O), and [`LocalIndicatorDriver::render`] writes each frame to the
//! [`IndicatorPort`] and blocks for its hold time.
//!
//! ## Patterns
//!
//! | Level                | Pattern                                         |
//! |----------------------|-------------------------------------------------|
//! | Clear                | nothing                                         |
//! | Light / Moderate / Heavy | rain wave × `wave_repeats()`                |
//! | Storm                | each pixel flashed once, left to right          |
//!
//! The strip is mirrored: pixel pairs `(0,5) (1,4) (2,3)` light from the
//! outside in, then clear in the same order.

use heapless::Vec;
use log::debug;

use crate::app::ports::{IndicatorPort, TimePort, WatchdogPort};
use crate::config::IndicatorConfig;
use crate::severity::SeverityLevel;

/// Colour as (R, G, B), each 0–255.
pub type Rgb = (u8, u8, u8);

pub const INDICATOR_COUNT: usize = 6;

/// One full strip state.
pub type Pixels = [Rgb; INDICATOR_COUNT];

pub const OFF: Rgb = (0, 0, 0);
/// Rain wave colour.
pub const RAIN: Rgb = (36, 229, 250);
/// Thunder warning colour.
pub const STORM: Rgb = (255, 255, 15);

/// Mirrored pairs, outermost first.
const WAVE_PAIRS: [(usize, usize); INDICATOR_COUNT / 2] = [(0, 5), (1, 4), (2, 3)];

/// Frames in one wave: light three pairs, clear three pairs.
const FRAMES_PER_WAVE: usize = WAVE_PAIRS.len() * 2;

/// Longest possible plan (heavy rain, three waves).
pub const MAX_FRAMES: usize = FRAMES_PER_WAVE * 3;

/// A strip state plus how long to hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub pixels: Pixels,
    pub hold_ms: u32,
}

pub type Sequence = Vec<Frame, MAX_FRAMES>;

/// Plan the frames for `level`.  Empty for [`SeverityLevel::Clear`].
pub fn sequence_for(level: SeverityLevel, cfg: &IndicatorConfig) -> Sequence {
    let mut seq = Sequence::new();
    match level {
        SeverityLevel::Clear => {}
        SeverityLevel::Storm => {
            for i in 0..INDICATOR_COUNT {
                let mut pixels = [OFF; INDICATOR_COUNT];
                pixels[i] = STORM;
                push(&mut seq, pixels, cfg.storm_flash_hold_ms);
                // Blank frame shows the flash ended before the next pixel.
                push(&mut seq, [OFF; INDICATOR_COUNT], 0);
            }
        }
        _ => {
            for _ in 0..level.wave_repeats() {
                append_wave(&mut seq, cfg);
            }
        }
    }
    seq
}

fn append_wave(seq: &mut Sequence, cfg: &IndicatorConfig) {
    let mut pixels = [OFF; INDICATOR_COUNT];
    for &(a, b) in &WAVE_PAIRS {
        pixels[a] = RAIN;
        pixels[b] = RAIN;
        push(seq, pixels, cfg.wave_step_ms);
    }
    for (n, &(a, b)) in WAVE_PAIRS.iter().enumerate() {
        pixels[a] = OFF;
        pixels[b] = OFF;
        let hold = if n + 1 == WAVE_PAIRS.len() {
            cfg.wave_pause_ms
        } else {
            cfg.wave_step_ms
        };
        push(seq, pixels, hold);
    }
}

fn push(seq: &mut Sequence, pixels: Pixels, hold_ms: u32) {
    // Capacity covers the longest plan; overflow would be a planning bug.
    let pushed = seq.push(Frame { pixels, hold_ms });
    debug_assert!(pushed.is_ok(), "indicator sequence overflow");
}

/// Plays weather sequences on the local strip.
#[derive(Debug, Clone)]
pub struct LocalIndicatorDriver {
    cfg: IndicatorConfig,
}

impl LocalIndicatorDriver {
    pub fn new(cfg: IndicatorConfig) -> Self {
        Self { cfg }
    }

    /// Render the full pattern for `level`, blocking until it finishes.
    /// The watchdog is fed after every frame, so no single stretch exceeds
    /// the longest hold.  Returns the number of frames shown.
    pub fn render<P>(&self, level: SeverityLevel, port: &mut P) -> usize
    where
        P: IndicatorPort + TimePort + WatchdogPort,
    {
        let seq = sequence_for(level, &self.cfg);
        if seq.is_empty() {
            return 0;
        }
        debug!("Indicator: {} ({} frames)", level.name(), seq.len());
        for frame in &seq {
            port.show(&frame.pixels);
            if frame.hold_ms > 0 {
                port.delay_ms(frame.hold_ms);
            }
            port.feed();
        }
        seq.len()
    }
}
