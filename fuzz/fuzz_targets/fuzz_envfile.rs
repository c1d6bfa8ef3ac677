#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Parsing is total and serialization round-trips - neither may panic
        let env = lempkit::EnvFile::parse(content);
        let _ = env.to_string();
    }
});
