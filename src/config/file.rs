//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::ParityConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[".sbom-parity.yaml", ".sbom-parity.yml", "sbom-parity.yaml"];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/sbom-parity/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    let cwd = std::env::current_dir().ok();
    if let Some(path) = cwd.as_deref().and_then(find_config_in_dir) {
        return Some(path);
    }

    if let Some(path) = find_git_root().as_deref().and_then(find_config_in_dir) {
        return Some(path);
    }

    if let Some(config_dir) = dirs::config_dir() {
        if let Some(path) = find_config_in_dir(&config_dir.join("sbom-parity")) {
            return Some(path);
        }
    }

    dirs::home_dir().as_deref().and_then(find_config_in_dir)
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml_ng::Error),
}

/// Load a `ParityConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<ParityConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: ParityConfig = serde_yaml_ng::from_str(&content)?;
    Ok(config)
}

/// Generate an example config file content.
#[must_use]
pub fn generate_example_config() -> String {
    format!(
        "# sbom-parity configuration\n# Place this file at .sbom-parity.yaml in your project root or ~/.config/sbom-parity/\n\n{}",
        serde_yaml_ng::to_string(&ParityConfig::default()).unwrap_or_default()
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".sbom-parity.yaml");
        std::fs::write(&config_path, "output:\n  pretty: true\n").unwrap();

        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");

        let yaml = r#"
parser:
  initial_buffer_size: 16
comparison:
  root_package_id: SPDXRef-Root
  normalize_root_package: false
output:
  pretty: true
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.parser.initial_buffer_size, 16);
        assert_eq!(config.comparison.root_package_id, "SPDXRef-Root");
        assert!(!config.comparison.normalize_root_package);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_load_config_file_invalid_yaml() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        std::fs::write(&config_path, "parser: [unterminated").unwrap();
        assert!(matches!(load_config_file(&config_path), Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "output:\n  pretty: true\n").unwrap();

        assert_eq!(discover_config_file(Some(&config_path)), Some(config_path.clone()));
        assert!(load_config_file(&config_path).unwrap().output.pretty);
    }

    #[test]
    fn test_example_config_parses_back() {
        let example = generate_example_config();
        let config: ParityConfig = serde_yaml_ng::from_str(&example).unwrap();
        assert_eq!(config, ParityConfig::default());
    }
}
