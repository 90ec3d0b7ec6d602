//! Output drivers: indicator sequencing, the WS2812 strip and the task
//! watchdog.

pub mod indicator;
pub mod led_strip;
pub mod watchdog;
