//! **Streaming SPDX parsing and cross-version equality checking.**
//!
//! `sbom-parity` reads SPDX 2.2 JSON and SPDX 3.0 JSON-LD documents without
//! loading them whole, reduces both to a common entity model and decides
//! whether two documents describe the same software.
//!
//! ## Core Concepts & Modules
//!
//! - **[`parsers`]**: the pull-based [`LargeDocumentParser`] and one parser
//!   per SPDX version. Array properties are enumerated item by item, so
//!   memory stays bounded by the largest single record.
//! - **[`model`]**: the version-specific records and the common entities
//!   ([`SbomFile`], [`SbomPackage`], [`SbomRelationship`], [`SbomReference`]).
//! - **[`convert`]**: converters between each version and the common model.
//! - **[`compare`]**: the [`SbomComparator`] and its per-category comparers.
//! - **[`writer`]**: streaming generators for both versions.
//!
//! ## Getting Started
//!
//! ```no_run
//! use sbom_parity::config::ParityConfig;
//! use sbom_parity::{parse_path, SbomComparator};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ParityConfig::default();
//!     let left = parse_path(Path::new("app.spdx.json"), &config.parser)?;
//!     let right = parse_path(Path::new("app.spdx3.json"), &config.parser)?;
//!
//!     let result = SbomComparator::new(&config.comparison).compare(&left.entities, &right.entities);
//!     print!("{}", result.report());
//!     Ok(())
//! }
//! ```
//!
//! ## Regenerating a Document
//!
//! ```no_run
//! use sbom_parity::config::ParityConfig;
//! use sbom_parity::writer::{write_spdx30, WriterOptions};
//! use sbom_parity::parse_path;
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ParityConfig::default();
//!     let parsed = parse_path(Path::new("app.spdx.json"), &config.parser)?;
//!     let out = std::fs::File::create("app.spdx3.json")?;
//!     write_spdx30(
//!         &parsed.entities,
//!         &parsed.info,
//!         &parsed.entities.license_texts,
//!         out,
//!         &WriterOptions::from(&config.output),
//!     )?;
//!     Ok(())
//! }
//! ```

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names
)]

pub mod cli;
pub mod compare;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod parsers;
pub mod writer;

// Re-export main types for convenience
pub use compare::{CategoryOutcome, ComparisonResult, EntityCategory, EntityComparer, SbomComparator};
pub use config::{ComparisonConfig, ConfigError, OutputConfig, ParityConfig, ParserConfig, Validatable};
pub use error::{ErrorContext, Result, SbomError};
pub use model::{
    DocumentInfo, LicenseTextLookup, SbomEntities, SbomFile, SbomPackage, SbomReference, SbomRelationship,
};
pub use parsers::{
    parse_document, parse_entities, parse_path, LargeDocumentParser, ParseError, ParsedDocument, SpecVersion,
};
pub use writer::{write_spdx22, write_spdx30, WriteError, WriterOptions};
