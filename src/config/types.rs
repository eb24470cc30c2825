//! Configuration types for parsing, comparison and output.

use crate::model::ROOT_PACKAGE_ID;
use crate::model::spdx30::SPDX30_CONTEXT;
use crate::parsers::{DEFAULT_BUFFER_SIZE, DEFAULT_MAX_BUFFER_SIZE};
use crate::writer::DEFAULT_FLUSH_INTERVAL;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Smallest accepted initial buffer size.
pub const MIN_INITIAL_BUFFER_SIZE: usize = 16;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, loadable from YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ParityConfig {
    /// Streaming parser buffer sizing
    pub parser: ParserConfig,
    /// Equality rules
    pub comparison: ComparisonConfig,
    /// Writer formatting
    pub output: OutputConfig,
}

impl ParityConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Parser Configuration
// ============================================================================

/// Buffer sizing for the streaming parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ParserConfig {
    /// Initial read buffer size in bytes; the buffer doubles when a token
    /// does not fit
    pub initial_buffer_size: usize,
    /// Largest buffer a single token may require
    pub max_buffer_size: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: DEFAULT_BUFFER_SIZE,
            max_buffer_size: DEFAULT_MAX_BUFFER_SIZE,
        }
    }
}

// ============================================================================
// Comparison Configuration
// ============================================================================

/// Equality rules for the comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Id of the tool-generated root package
    pub root_package_id: String,
    /// Ignore purl qualifiers and checksums on the root package
    pub normalize_root_package: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            root_package_id: ROOT_PACKAGE_ID.to_string(),
            normalize_root_package: true,
        }
    }
}

// ============================================================================
// Output Configuration
// ============================================================================

/// Formatting of written documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Array items written between flushes
    pub flush_interval: usize,
    /// JSON-LD context written into SPDX 3.0 documents
    pub spdx30_context: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            spdx30_context: SPDX30_CONTEXT.to_string(),
        }
    }
}
