//! Fuzz target for YOLO label line parsing.

#![no_main]

use cxrprep::annotation::parse_label_line;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };

    let _ = parse_label_line(line);
});
