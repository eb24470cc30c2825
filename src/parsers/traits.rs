//! Parser error types and token kinds shared by the streaming layers.
//!
//! Structural failures carry the absolute byte offset of the offending token
//! so that a report against a multi-gigabyte document still points somewhere
//! useful. Missing required fields and caller contract violations are kept as
//! distinct variants because callers react to them differently.

use std::fmt;
use thiserror::Error;

/// Kind of a JSON token produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    PropertyName,
    String,
    Number,
    True,
    False,
    Null,
}

impl TokenKind {
    /// Whether this token opens a value (scalar or container).
    #[must_use]
    pub const fn starts_value(self) -> bool {
        !matches!(self, Self::EndObject | Self::EndArray | Self::PropertyName)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StartObject => "StartObject",
            Self::EndObject => "EndObject",
            Self::StartArray => "StartArray",
            Self::EndArray => "EndArray",
            Self::PropertyName => "PropertyName",
            Self::String => "String",
            Self::Number => "Number",
            Self::True => "True",
            Self::False => "False",
            Self::Null => "Null",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while reading an SBOM document.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected token at byte {offset}: expected {expected}, found {actual}")]
    UnexpectedToken {
        offset: u64,
        expected: String,
        actual: TokenKind,
    },

    #[error("unexpected end of stream at byte {offset}")]
    UnexpectedEndOfStream { offset: u64 },

    #[error("invalid JSON at byte {offset}: {message}")]
    InvalidJson { offset: u64, message: String },

    #[error("document root must be an object, found {actual} at byte {offset}")]
    InvalidRoot { offset: u64, actual: TokenKind },

    #[error("missing required field '{field}' in {entity}")]
    MissingField { field: String, entity: String },

    #[error("invalid value for '{field}': {value}")]
    InvalidValue { field: String, value: String },

    #[error("token buffer would exceed the {limit} byte limit at byte {offset}")]
    BufferLimitExceeded { offset: u64, limit: usize },

    #[error("parser contract violation: {0}")]
    ContractViolation(String),

    #[error("failed to decode {entity}: {message}")]
    Deserialize { entity: String, message: String },
}

impl ParseError {
    /// Build an unexpected-token error.
    pub fn unexpected(offset: u64, expected: impl Into<String>, actual: TokenKind) -> Self {
        Self::UnexpectedToken {
            offset,
            expected: expected.into(),
            actual,
        }
    }

    /// Build a missing-field error.
    pub fn missing_field(field: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            entity: entity.into(),
        }
    }

    /// Build an invalid-value error.
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for errors caused by malformed bytes or token order.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedToken { .. }
                | Self::UnexpectedEndOfStream { .. }
                | Self::InvalidJson { .. }
                | Self::InvalidRoot { .. }
                | Self::BufferLimitExceeded { .. }
        )
    }

    /// True when the caller broke the enumeration protocol.
    #[must_use]
    pub const fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContractViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_token_message() {
        let err = ParseError::unexpected(42, "PropertyName", TokenKind::Number);
        let msg = err.to_string();
        assert!(msg.contains("42"));
        assert!(msg.contains("PropertyName"));
        assert!(msg.contains("Number"));
        assert!(err.is_structural());
    }

    #[test]
    fn test_error_classification() {
        assert!(!ParseError::missing_field("to", "Relationship").is_structural());
        assert!(ParseError::ContractViolation("x".into()).is_contract_violation());
        assert!(ParseError::UnexpectedEndOfStream { offset: 0 }.is_structural());
    }

    #[test]
    fn test_starts_value() {
        assert!(TokenKind::StartObject.starts_value());
        assert!(TokenKind::Null.starts_value());
        assert!(!TokenKind::PropertyName.starts_value());
        assert!(!TokenKind::EndArray.starts_value());
    }
}
