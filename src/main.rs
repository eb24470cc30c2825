//! sbom-parity: SPDX 2.2 / 3.0 equivalence checker
//!
//! Parses SBOM documents of either version in a single streaming pass and
//! checks whether they describe the same software.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sbom_parity::cli::{self, exit_codes, CompareArgs, ConvertArgs, TargetVersion};
use sbom_parity::config::{
    self, discover_config_file, generate_example_config, load_config_file, ParityConfig, Validatable,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build long version string with format support info
const fn build_long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\n\nSupported SBOM Formats:",
        "\n  SPDX: 2.2, 3.0 (JSON, JSON-LD)"
    )
}

#[derive(Parser)]
#[command(name = "sbom-parity")]
#[command(version, long_version = build_long_version())]
#[command(about = "Check SPDX 2.2 and SPDX 3.0 documents for semantic equality", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  Documents are equivalent (or conversion succeeded)
    1  Documents differ
    3  Error occurred

EXAMPLES:
    # Check a 2.2 document against its 3.0 counterpart
    sbom-parity compare app.spdx.json app.spdx3.json

    # Full JSON report of every mismatch
    sbom-parity compare app.spdx.json app.spdx3.json --full --json

    # Regenerate a 2.2 document as 3.0
    sbom-parity convert app.spdx.json --to 3.0 -O app.spdx3.json")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two documents for semantic equality
    Compare {
        /// First document (either version)
        left: PathBuf,

        /// Second document (either version)
        right: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Compare every category instead of stopping at the first mismatch
        #[arg(long)]
        full: bool,

        /// Output file path (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,
    },

    /// Regenerate a document as another SPDX version
    Convert {
        /// Document to convert (either version)
        input: PathBuf,

        /// Version to generate
        #[arg(long, value_enum)]
        to: TargetVersion,

        /// Output file path (stdout if not specified)
        #[arg(short = 'O', long)]
        output_file: Option<PathBuf>,

        /// Pretty-print the generated JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .sbom-parity.yaml in the current directory
    Init,
    /// Print the JSON Schema of the configuration file
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let exit_code = match cli.command {
        Commands::Compare {
            left,
            right,
            json,
            full,
            output_file,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let args = CompareArgs {
                left,
                right,
                json,
                full,
                output_file,
            };
            cli::run_compare(&args, &config)
        }

        Commands::Convert {
            input,
            to,
            output_file,
            pretty,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let args = ConvertArgs {
                input,
                to,
                output_file,
                pretty,
            };
            cli::run_convert(&args, &config)
        }

        Commands::Config { action } => run_config(action, cli.config.as_deref()).map(|()| exit_codes::SUCCESS),
    };

    match exit_code {
        Ok(code) if code != exit_codes::SUCCESS => std::process::exit(code),
        Ok(_) => Ok(()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

/// Load the discovered config file (or defaults) and reject invalid values.
fn load_config(explicit: Option<&Path>) -> Result<ParityConfig> {
    let config = match discover_config_file(explicit) {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(&path).with_context(|| format!("Failed to load {}", path.display()))?
        }
        None => {
            if let Some(path) = explicit {
                bail!("Config file not found: {}", path.display());
            }
            ParityConfig::default()
        }
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let details: Vec<String> = errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", details.join("\n  "));
    }
    Ok(config)
}

fn run_config(action: ConfigAction, explicit: Option<&Path>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(explicit)?;
            print!("{}", serde_yaml_ng::to_string(&config).context("Failed to render config")?);
        }
        ConfigAction::Path => {
            println!("Search order:");
            println!("  1. --config <path>");
            println!("  2. ./.sbom-parity.yaml, ./.sbom-parity.yml, ./sbom-parity.yaml");
            println!("  3. <git root>/.sbom-parity.yaml");
            if let Some(dir) = dirs::config_dir() {
                println!("  4. {}", dir.join("sbom-parity").display());
            }
            if let Some(home) = dirs::home_dir() {
                println!("  5. {}", home.display());
            }
            match discover_config_file(explicit) {
                Some(path) => println!("\nUsing: {}", path.display()),
                None => println!("\nNo config file found, using defaults"),
            }
        }
        ConfigAction::Init => {
            let path = PathBuf::from(".sbom-parity.yaml");
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            std::fs::write(&path, generate_example_config())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Created {}", path.display());
        }
        ConfigAction::Schema => {
            println!("{}", config::generate_json_schema().context("Failed to generate schema")?);
        }
    }
    Ok(())
}
