//! Fuzz target: bridge response parsing
//!
//! Feeds arbitrary bytes to the group-state and PUT-result parsers, which
//! see whatever the bridge (or anything squatting on its address) returns.
//!
//! cargo fuzz run fuzz_bridge_state

#![no_main]

use libfuzzer_sys::fuzz_target;
use weathernode::bridge::{parse_group_power, write_rejected};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    let _ = parse_group_power(body);
    let _ = write_rejected(body);
});
