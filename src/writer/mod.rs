//! Streaming SPDX output.
//!
//! [`JsonStreamWriter`] emits JSON tokens straight to a sink.
//! [`Spdx22DocumentWriter`] and [`Spdx30DocumentWriter`] build on it to
//! write whole documents one record at a time, and [`write_spdx22`] /
//! [`write_spdx30`] convert common entities on the fly.

mod json;
mod spdx22;
mod spdx30;

pub use json::{JsonStreamWriter, DEFAULT_FLUSH_INTERVAL};
pub use spdx22::Spdx22DocumentWriter;
pub use spdx30::Spdx30DocumentWriter;

use crate::config::OutputConfig;
use crate::convert::{spdx22 as convert22, spdx30::ElementGenerator};
use crate::model::spdx22::Spdx22Header;
use crate::model::spdx30::SPDX30_CONTEXT;
use crate::model::{DocumentInfo, IdentifierError, LicenseTextLookup, SbomEntities};
use std::io::Write;
use thiserror::Error;

/// Errors raised while writing output.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unbalanced document: {0}")]
    Unbalanced(String),

    #[error(transparent)]
    Identifier(#[from] IdentifierError),
}

/// Formatting options shared by the document writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterOptions {
    pub pretty: bool,
    /// Array items between sink flushes
    pub flush_interval: usize,
    /// `@context` written into SPDX 3.0 documents
    pub spdx30_context: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            spdx30_context: SPDX30_CONTEXT.to_string(),
        }
    }
}

impl From<&OutputConfig> for WriterOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            pretty: config.pretty,
            flush_interval: config.flush_interval,
            spdx30_context: config.spdx30_context.clone(),
        }
    }
}

/// Write `entities` as an SPDX 2.2 document.
///
/// Records are converted one at a time as they are written. Empty sections
/// are omitted.
pub fn write_spdx22<W: Write>(
    entities: &SbomEntities,
    header: &Spdx22Header,
    lookup: &LicenseTextLookup,
    sink: W,
    options: &WriterOptions,
) -> Result<W, WriteError> {
    let mut writer = Spdx22DocumentWriter::begin(sink, header, options)?;

    if !entities.files.is_empty() {
        writer.begin_section("files")?;
        for file in &entities.files {
            writer.write_item(&convert22::file_from_common(file)?)?;
        }
        writer.end_section()?;
    }
    if !entities.packages.is_empty() {
        writer.begin_section("packages")?;
        for package in &entities.packages {
            writer.write_item(&convert22::package_from_common(package))?;
        }
        writer.end_section()?;
    }
    if !entities.references.is_empty() {
        writer.begin_section("externalDocumentRefs")?;
        for reference in &entities.references {
            writer.write_item(&convert22::reference_from_common(reference))?;
        }
        writer.end_section()?;
    }
    let mut relationships = entities
        .relationships
        .iter()
        .filter_map(convert22::relationship_from_common)
        .peekable();
    if relationships.peek().is_some() {
        writer.begin_section("relationships")?;
        for relationship in relationships {
            writer.write_item(&relationship)?;
        }
        writer.end_section()?;
    }
    let licenses = convert22::extracted_licenses(entities, lookup);
    if !licenses.is_empty() {
        writer.write_extracted_licensing_infos(&licenses)?;
    }

    writer.finish()
}

/// Write `entities` as an SPDX 3.0 document, streaming each generated
/// element straight into `@graph`.
pub fn write_spdx30<W: Write>(
    entities: &SbomEntities,
    info: &DocumentInfo,
    lookup: &LicenseTextLookup,
    sink: W,
    options: &WriterOptions,
) -> Result<W, WriteError> {
    let mut writer = Spdx30DocumentWriter::begin(sink, options)?;
    ElementGenerator::new(lookup).all(entities, info, &mut |element| writer.write_element(&element))?;
    writer.finish()
}
