#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Parsing also builds every configured test, so this covers matrix resolution.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = perfrank_app::parse_config(s);
    }
});
