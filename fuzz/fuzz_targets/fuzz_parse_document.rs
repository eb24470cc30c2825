#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_parity::config::ParserConfig;
use sbom_parity::parsers::{detect, parse_entities};
use std::io::Cursor;

/// Fuzz version detection and the full parse path.
fuzz_target!(|data: &[u8]| {
    let _ = detect(data);
    let _ = parse_entities(Cursor::new(data), &ParserConfig::default());
});
