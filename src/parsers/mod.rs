//! Streaming SPDX parsers.
//!
//! Layers, bottom up:
//!
//! - `reader`: a growable byte buffer over any [`std::io::Read`].
//! - `tokenizer`: a resumable JSON tokenizer over that buffer.
//! - `stream`: couples the two into a token stream with byte offsets.
//! - [`streaming`]: the pull-based [`LargeDocumentParser`].
//! - [`Spdx22Parser`] and [`Spdx30Parser`]: one parser per SPDX version.
//!
//! [`parse_entities`] detects the version from a short prefix and returns
//! common entities ready for comparison.
//!
//! ## Usage
//!
//! ```no_run
//! use sbom_parity::config::ParserConfig;
//! use sbom_parity::parsers::parse_entities;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let reader = BufReader::new(File::open("sbom.spdx.json").unwrap());
//! let (version, entities) = parse_entities(reader, &ParserConfig::default()).unwrap();
//! println!("{version}: {} entities", entities.entity_count());
//! ```

mod detection;
mod reader;
mod spdx22;
mod spdx30;
mod stream;
pub mod streaming;
mod tokenizer;
mod traits;

pub use detection::{
    detect, detect_spec_version, DetectionResult, SpecVersion, DETECTION_PREFIX_LEN,
    MIN_CONFIDENCE_THRESHOLD,
};
pub use reader::{BufferedTokenReader, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BUFFER_SIZE, MIN_BUFFER_SIZE};
pub use spdx22::{Spdx22Parser, Spdx22Record};
pub use spdx30::Spdx30Parser;
pub use stream::TokenStream;
pub use streaming::{
    ArrayEnumerator, LargeDocumentParser, ParserResult, PropertyHandler, PropertyValue,
};
pub use tokenizer::{Scan, Token, Tokenizer};
pub use traits::{ParseError, TokenKind};

use crate::config::ParserConfig;
use crate::error::{ErrorContext, Result, SbomError};
use crate::model::{DocumentInfo, SbomEntities};
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// A parsed document reduced to common entities.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub version: SpecVersion,
    pub info: DocumentInfo,
    pub entities: SbomEntities,
}

/// Detect the SPDX version of `reader` and parse it into common entities,
/// keeping the document metadata.
///
/// Up to [`DETECTION_PREFIX_LEN`] bytes are read before detection however
/// the reader splits its reads; parsing then replays them.
pub fn parse_document<R: Read>(mut reader: R, config: &ParserConfig) -> Result<ParsedDocument> {
    let mut prefix = Vec::with_capacity(DETECTION_PREFIX_LEN);
    reader.by_ref().take(DETECTION_PREFIX_LEN as u64).read_to_end(&mut prefix)?;
    if prefix.is_empty() {
        return Err(SbomError::unknown_format("empty content"));
    }
    let version = detect_spec_version(&prefix).ok_or_else(|| {
        SbomError::unknown_format("expected an SPDX 2.2 or SPDX 3.0 JSON document")
    })?;
    tracing::debug!(%version, prefix = prefix.len(), "detected document version");
    let reader = Cursor::new(prefix).chain(reader);

    match version {
        SpecVersion::Spdx22 => {
            let (header, entities) = Spdx22Parser::new(reader, config)
                .parse_entities()
                .context("parsing SPDX 2.2 document")?;
            Ok(ParsedDocument {
                version,
                info: DocumentInfo::from_spdx22(&header),
                entities,
            })
        }
        SpecVersion::Spdx30 => {
            let (document, entities) = Spdx30Parser::new(reader, config)
                .parse_entities()
                .context("parsing SPDX 3.0 document")?;
            Ok(ParsedDocument {
                version,
                info: DocumentInfo::from_spdx30(&document),
                entities,
            })
        }
    }
}

/// Detect the SPDX version of `reader` and parse it into common entities.
pub fn parse_entities<R: Read>(reader: R, config: &ParserConfig) -> Result<(SpecVersion, SbomEntities)> {
    parse_document(reader, config).map(|doc| (doc.version, doc.entities))
}

/// Open and parse the document at `path`.
pub fn parse_path(path: &Path, config: &ParserConfig) -> Result<ParsedDocument> {
    let file = File::open(path).map_err(|e| SbomError::io(path, e))?;
    parse_document(BufReader::new(file), config).with_context(|| path.display().to_string())
}
