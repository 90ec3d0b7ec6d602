//! Fuzz target: `parse_condition_code`
//!
//! cargo fuzz run fuzz_condition_body

#![no_main]

use libfuzzer_sys::fuzz_target;
use weathernode::adapters::weather_api::parse_condition_code;
use weathernode::severity::SeverityClassifier;

fuzz_target!(|data: &[u8]| {
    let Ok(body) = std::str::from_utf8(data) else {
        return;
    };
    // Whatever comes back must classify.
    if let Some(code) = parse_condition_code(body) {
        let _ = SeverityClassifier::default().classify(code);
    }
});
