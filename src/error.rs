//! Unified error types for sbom-parity.
//!
//! Each layer has its own error enum ([`ParseError`], [`IdentifierError`],
//! [`WriteError`]). [`SbomError`] wraps them with a chain of context strings
//! describing what the caller was doing.

use crate::model::IdentifierError;
use crate::parsers::ParseError;
use crate::writer::WriteError;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sbom-parity operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SbomError {
    /// Errors while reading a document
    #[error("Failed to parse SBOM: {context}")]
    Parse {
        context: String,
        #[source]
        source: ParseError,
    },

    /// An entity lacks a hash needed for its identifier
    #[error("Identifier generation failed: {context}")]
    Identifier {
        context: String,
        #[source]
        source: IdentifierError,
    },

    /// Errors while writing a document
    #[error("Failed to write SBOM: {context}")]
    Write {
        context: String,
        #[source]
        source: WriteError,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Neither SPDX version could be recognized
    #[error("Unknown SBOM format: {0}")]
    UnknownFormat(String),
}

/// Convenient Result type for sbom-parity operations
pub type Result<T> = std::result::Result<T, SbomError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl SbomError {
    /// Create a parse error with context
    pub fn parse(context: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        let message = format!("{source}");
        Self::Io {
            path: Some(path),
            message,
            source,
        }
    }

    pub fn unknown_format(message: impl Into<String>) -> Self {
        Self::UnknownFormat(message.into())
    }

    /// Whether an entity lacked the hash its identifier needs.
    pub fn is_missing_hash(&self) -> bool {
        matches!(
            self,
            Self::Identifier {
                source: IdentifierError::MissingHashValue { .. },
                ..
            } | Self::Write {
                source: WriteError::Identifier(IdentifierError::MissingHashValue { .. }),
                ..
            }
        )
    }
}

// ============================================================================
// Conversions from layer error types
// ============================================================================

impl From<ParseError> for SbomError {
    fn from(err: ParseError) -> Self {
        Self::parse(String::new(), err)
    }
}

impl From<IdentifierError> for SbomError {
    fn from(err: IdentifierError) -> Self {
        Self::Identifier {
            context: String::new(),
            source: err,
        }
    }
}

impl From<WriteError> for SbomError {
    fn from(err: WriteError) -> Self {
        Self::Write {
            context: String::new(),
            source: err,
        }
    }
}

impl From<std::io::Error> for SbomError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain, so an error raised deep in a call stack reads
/// `outer: middle: inner` by the time it reaches the user.
///
/// ```ignore
/// use sbom_parity::error::ErrorContext;
///
/// let parser = Spdx22Parser::new(reader, &config);
/// let (header, entities) = parser
///     .parse_entities()
///     .with_context(|| format!("reading {}", path.display()))?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure, evaluated only on error.
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<SbomError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Prefix the error's context with `new_ctx`.
fn add_context_to_error(mut err: SbomError, new_ctx: &str) -> SbomError {
    let slot = match &mut err {
        SbomError::Parse { context, .. }
        | SbomError::Identifier { context, .. }
        | SbomError::Write { context, .. } => context,
        SbomError::Io { message, .. } => message,
        SbomError::UnknownFormat(message) => message,
    };
    *slot = if slot.is_empty() {
        new_ctx.to_string()
    } else {
        format!("{new_ctx}: {slot}")
    };
    err
}
