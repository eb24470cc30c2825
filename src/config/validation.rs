//! Configuration validation.

use super::types::{ComparisonConfig, OutputConfig, ParityConfig, ParserConfig, MIN_INITIAL_BUFFER_SIZE};

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for ParityConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.parser.validate());
        errors.extend(self.comparison.validate());
        errors.extend(self.output.validate());
        errors
    }
}

impl Validatable for ParserConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.initial_buffer_size < MIN_INITIAL_BUFFER_SIZE {
            errors.push(ConfigError {
                field: "parser.initial_buffer_size".to_string(),
                message: format!(
                    "Must be at least {MIN_INITIAL_BUFFER_SIZE} bytes, got {}",
                    self.initial_buffer_size
                ),
            });
        }
        if self.max_buffer_size < self.initial_buffer_size {
            errors.push(ConfigError {
                field: "parser.max_buffer_size".to_string(),
                message: format!(
                    "Must not be smaller than initial_buffer_size ({}), got {}",
                    self.initial_buffer_size, self.max_buffer_size
                ),
            });
        }
        errors
    }
}

impl Validatable for ComparisonConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.root_package_id.trim().is_empty() {
            errors.push(ConfigError {
                field: "comparison.root_package_id".to_string(),
                message: "Root package id must not be empty".to_string(),
            });
        }
        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.flush_interval == 0 {
            errors.push(ConfigError {
                field: "output.flush_interval".to_string(),
                message: "Flush interval must be at least 1".to_string(),
            });
        }
        if self.spdx30_context.trim().is_empty() {
            errors.push(ConfigError {
                field: "output.spdx30_context".to_string(),
                message: "SPDX 3.0 context URI must not be empty".to_string(),
            });
        }
        errors
    }
}
