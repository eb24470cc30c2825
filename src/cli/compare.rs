//! Compare command handler.
//!
//! Implements the `compare` subcommand for checking two documents for
//! semantic equality.

use super::{exit_codes, write_output, OutputTarget};
use crate::compare::{ComparisonResult, SbomComparator};
use crate::config::ParityConfig;
use crate::parsers::parse_path;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Inputs for the `compare` subcommand.
#[derive(Debug, Clone)]
pub struct CompareArgs {
    pub left: PathBuf,
    pub right: PathBuf,
    /// Emit the result as JSON instead of a text report
    pub json: bool,
    /// Evaluate every category instead of stopping at the first mismatch
    pub full: bool,
    pub output_file: Option<PathBuf>,
}

/// Run the compare command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_compare(args: &CompareArgs, config: &ParityConfig) -> Result<i32> {
    let left = parse_path(&args.left, &config.parser)
        .with_context(|| format!("Failed to parse {}", args.left.display()))?;
    let right = parse_path(&args.right, &config.parser)
        .with_context(|| format!("Failed to parse {}", args.right.display()))?;

    tracing::info!(
        "Parsed {} entities from {} ({}), {} from {} ({})",
        left.entities.entity_count(),
        args.left.display(),
        left.version,
        right.entities.entity_count(),
        args.right.display(),
        right.version
    );

    let comparator = SbomComparator::new(&config.comparison);
    let result = if args.full {
        comparator.diff(&left.entities, &right.entities)
    } else {
        comparator.compare(&left.entities, &right.entities)
    };

    let rendered = render(&result, args.json)?;
    write_output(&rendered, &OutputTarget::from_option(args.output_file.clone()))?;

    Ok(determine_exit_code(&result))
}

fn render(result: &ComparisonResult, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(result).context("Failed to serialize comparison result")
    } else {
        Ok(result.report())
    }
}

const fn determine_exit_code(result: &ComparisonResult) -> i32 {
    if result.equal {
        exit_codes::SUCCESS
    } else {
        exit_codes::DOCUMENTS_DIFFER
    }
}
