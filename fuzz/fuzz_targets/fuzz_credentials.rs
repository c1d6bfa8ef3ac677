#![no_main]

use libfuzzer_sys::fuzz_target;
use std::path::Path;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Strict credentials parsing should reject, never panic
        let _ = lempkit::Credentials::parse(Path::new("lempkit.env"), content);
    }
});
