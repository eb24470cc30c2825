//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs. Each returns the exit code the
//! process should end with.

mod compare;
mod convert;

pub use compare::{run_compare, CompareArgs};
pub use convert::{run_convert, ConvertArgs, TargetVersion};

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Exit codes shared by all commands.
pub mod exit_codes {
    /// Success, documents are equivalent
    pub const SUCCESS: i32 = 0;
    /// The compared documents differ
    pub const DOCUMENTS_DIFFER: i32 = 1;
    /// An error occurred
    pub const ERROR: i32 = 3;
}

/// Where command output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write to stdout
    Stdout,
    /// Write to a file
    File(PathBuf),
}

impl OutputTarget {
    /// Create output target from optional path
    pub fn from_option(path: Option<PathBuf>) -> Self {
        match path {
            Some(p) => Self::File(p),
            None => Self::Stdout,
        }
    }

    /// Open a buffered sink for this target.
    pub fn open(&self) -> Result<Box<dyn Write>> {
        match self {
            Self::Stdout => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
            Self::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file {}", path.display()))?;
                Ok(Box::new(BufWriter::new(file)))
            }
        }
    }
}

/// Write `content` to the target.
pub fn write_output(content: &str, target: &OutputTarget) -> Result<()> {
    match target {
        OutputTarget::Stdout => {
            println!("{content}");
            Ok(())
        }
        OutputTarget::File(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            tracing::info!("Output written to {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_target_from_option() {
        assert_eq!(OutputTarget::from_option(None), OutputTarget::Stdout);
        let path = PathBuf::from("/tmp/out.json");
        assert_eq!(OutputTarget::from_option(Some(path.clone())), OutputTarget::File(path));
    }

    #[test]
    fn test_write_output_to_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("report.txt");
        write_output("hello", &OutputTarget::File(path.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "hello");
    }
}
