//! Convert command handler.
//!
//! Implements the `convert` subcommand: parse a document of either version
//! and regenerate it as the requested one.

use super::{exit_codes, OutputTarget};
use crate::config::ParityConfig;
use crate::parsers::{parse_path, SpecVersion};
use crate::writer::{write_spdx22, write_spdx30, WriterOptions};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::PathBuf;

/// Version to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TargetVersion {
    #[value(name = "2.2")]
    Spdx22,
    #[value(name = "3.0")]
    Spdx30,
}

impl From<TargetVersion> for SpecVersion {
    fn from(version: TargetVersion) -> Self {
        match version {
            TargetVersion::Spdx22 => Self::Spdx22,
            TargetVersion::Spdx30 => Self::Spdx30,
        }
    }
}

/// Inputs for the `convert` subcommand.
#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub input: PathBuf,
    pub to: TargetVersion,
    /// Output file path (stdout if not specified)
    pub output_file: Option<PathBuf>,
    /// Overrides the configured pretty-printing
    pub pretty: bool,
}

/// Run the convert command, returning the desired exit code.
pub fn run_convert(args: &ConvertArgs, config: &ParityConfig) -> Result<i32> {
    let parsed = parse_path(&args.input, &config.parser)
        .with_context(|| format!("Failed to parse {}", args.input.display()))?;

    let target = SpecVersion::from(args.to);
    if parsed.version == target {
        tracing::info!("{} is already {target}, regenerating", args.input.display());
    }

    let mut options = WriterOptions::from(&config.output);
    options.pretty |= args.pretty;

    let output = OutputTarget::from_option(args.output_file.clone());
    let sink = output.open()?;
    let lookup = &parsed.entities.license_texts;
    let mut sink = match target {
        SpecVersion::Spdx22 => {
            let header = parsed.info.spdx22_header();
            write_spdx22(&parsed.entities, &header, lookup, sink, &options)
        }
        SpecVersion::Spdx30 => write_spdx30(&parsed.entities, &parsed.info, lookup, sink, &options),
    }
    .with_context(|| format!("Failed to write {target} document"))?;
    sink.flush().context("Failed to flush output")?;

    tracing::info!(
        "Wrote {} entities as {target}",
        parsed.entities.entity_count()
    );
    Ok(exit_codes::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse_entities;
    use std::io::BufReader;

    const SPDX22: &str = r#"{
        "spdxVersion": "SPDX-2.2",
        "dataLicense": "CC0-1.0",
        "SPDXID": "SPDXRef-DOCUMENT",
        "name": "demo",
        "documentNamespace": "https://example.com/demo",
        "creationInfo": {"created": "2024-01-01T00:00:00Z", "creators": ["Tool: demo"]},
        "packages": [{"SPDXID": "SPDXRef-Package-a", "name": "a", "versionInfo": "1.0"}]
    }"#;

    #[test]
    fn test_convert_to_spdx30_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let input = tmp.path().join("in.spdx.json");
        let output = tmp.path().join("out.spdx3.json");
        std::fs::write(&input, SPDX22).unwrap();

        let args = ConvertArgs {
            input,
            to: TargetVersion::Spdx30,
            output_file: Some(output.clone()),
            pretty: false,
        };
        let code = run_convert(&args, &ParityConfig::default()).unwrap();
        assert_eq!(code, exit_codes::SUCCESS);

        let file = std::fs::File::open(output).unwrap();
        let (version, entities) = parse_entities(BufReader::new(file), &Default::default()).unwrap();
        assert_eq!(version, SpecVersion::Spdx30);
        assert_eq!(entities.packages.len(), 1);
        assert_eq!(entities.packages[0].name, "a");
    }
}
