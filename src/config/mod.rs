//! Configuration for sbom-parity.
//!
//! Settings are grouped by the layer they tune:
//!
//! - [`ParserConfig`]: streaming parser buffer sizes
//! - [`ComparisonConfig`]: root-package normalization
//! - [`OutputConfig`]: writer formatting
//!
//! # Configuration File
//!
//! Place a `.sbom-parity.yaml` file in your project root or
//! `~/.config/sbom-parity/`:
//!
//! ```yaml
//! parser:
//!   initial_buffer_size: 65536
//! comparison:
//!   root_package_id: SPDXRef-RootPackage
//! output:
//!   pretty: true
//! ```

pub mod file;
mod types;
mod validation;

pub use file::{
    discover_config_file, generate_example_config, load_config_file, ConfigFileError,
};
pub use types::{ComparisonConfig, OutputConfig, ParityConfig, ParserConfig, MIN_INITIAL_BUFFER_SIZE};
pub use validation::{ConfigError, Validatable};

/// Generate a JSON Schema for the `ParityConfig` configuration format.
///
/// Editors can use it to validate and autocomplete `.sbom-parity.yaml`.
pub fn generate_json_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(ParityConfig);
    serde_json::to_string_pretty(&schema)
}
