#![no_main]
use libfuzzer_sys::fuzz_target;
use sbom_parity::parsers::{LargeDocumentParser, PropertyHandler};
use std::io::Cursor;

/// Fuzz the pull parser with a tiny buffer so that tokens straddle refills.
fuzz_target!(|data: &[u8]| {
    let mut parser = LargeDocumentParser::with_buffer(Cursor::new(data), 4, 1 << 16)
        .with_handler("name", PropertyHandler::String)
        .with_handler("count", PropertyHandler::Integer)
        .with_handler("items", PropertyHandler::Array(|v| Ok(v)));

    while let Ok(Some(result)) = parser.next() {
        if result.is_array {
            match parser.array_items() {
                Ok(items) => items.for_each(drop),
                Err(_) => return,
            }
        }
    }
});
