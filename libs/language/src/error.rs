//! Specification errors for message construction and parsing
//!
//! Every parse failure carries a 1-based line and column so a human can
//! correct the specification text. Failures inside a nested message keep
//! both the outer position of the embedded literal and the inner error.

use thiserror::Error;
use types::EscapeError;

/// Errors raised while building or parsing a message specification
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// Two components share a unique name
    #[error("Message has multiple {clause} clauses, but should only have one.")]
    Validation { clause: String },

    /// Grammar failure
    #[error("{message} (line {line}, column {column})")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// A nested message literal failed to parse as its declared kind
    #[error("Invalid nested message at line {line}, column {column}: {source}")]
    Nested {
        line: usize,
        column: usize,
        source: Box<SpecError>,
    },

    /// A literal contains a malformed escape sequence
    #[error("Invalid literal at line {line}, column {column}: {source}")]
    Escape {
        line: usize,
        column: usize,
        source: EscapeError,
    },
}

impl SpecError {
    /// Duplicate unique component
    pub fn duplicate_clause(clause: impl Into<String>) -> Self {
        Self::Validation {
            clause: clause.into(),
        }
    }

    /// Grammar failure at a position
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Attach the outer position of a nested literal to its inner failure
    pub fn nested(line: usize, column: usize, inner: SpecError) -> Self {
        Self::Nested {
            line,
            column,
            source: Box::new(inner),
        }
    }

    /// Outermost position, when the error has one
    pub fn location(&self) -> Option<(usize, usize)> {
        match self {
            Self::Validation { .. } => None,
            Self::Parse { line, column, .. }
            | Self::Nested { line, column, .. }
            | Self::Escape { line, column, .. } => Some((*line, *column)),
        }
    }

    /// The error at the deepest nesting level
    pub fn innermost(&self) -> &SpecError {
        match self {
            Self::Nested { source, .. } => source.innermost(),
            other => other,
        }
    }
}

/// Result type for specification operations
pub type SpecResult<T> = std::result::Result<T, SpecError>;
