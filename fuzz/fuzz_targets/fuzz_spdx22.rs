#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_parity::config::ParserConfig;
use sbom_parity::parsers::Spdx22Parser;
use std::io::Cursor;

/// Fuzz the SPDX 2.2 parser directly.
///
/// Wraps input in a 2.2 envelope to reach record decoding rather than
/// failing at the root fields.
fuzz_target!(|data: &[u8]| {
    let _ = Spdx22Parser::new(Cursor::new(data), &ParserConfig::default()).parse_entities();

    if let Ok(s) = std::str::from_utf8(data) {
        if s.len() < 10_000 {
            let wrapped = format!(
                r#"{{"spdxVersion":"SPDX-2.2","dataLicense":"CC0-1.0","SPDXID":"SPDXRef-DOCUMENT","name":"fuzz","documentNamespace":"https://example.com/fuzz","creationInfo":{{"created":"2024-01-01T00:00:00Z","creators":["Tool: fuzz"]}},"packages":[{s}]}}"#,
            );
            let _ = Spdx22Parser::new(Cursor::new(wrapped.as_bytes()), &ParserConfig::default()).parse_entities();
        }
    }
});
