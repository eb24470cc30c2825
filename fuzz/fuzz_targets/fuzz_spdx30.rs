#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_parity::config::ParserConfig;
use sbom_parity::parsers::Spdx30Parser;
use std::io::Cursor;

/// Fuzz the SPDX 3.0 parser directly.
fuzz_target!(|data: &[u8]| {
    let _ = Spdx30Parser::new(Cursor::new(data), &ParserConfig::default()).parse_entities();

    if let Ok(s) = std::str::from_utf8(data) {
        if s.len() < 10_000 {
            let wrapped = format!(
                r#"{{"@context":"https://spdx.org/rdf/3.0.1/spdx-context.jsonld","@graph":[{s}]}}"#,
            );
            let _ = Spdx30Parser::new(Cursor::new(wrapped.as_bytes()), &ParserConfig::default()).parse_entities();
        }
    }
});
