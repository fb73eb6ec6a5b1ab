//! Errors raised while decoding escaped literal text

use thiserror::Error;

/// Escape decoding errors with the byte position of the offending sequence
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EscapeError {
    /// `\x` not followed by two hex digits
    #[error("invalid \\x escape at position {position}")]
    InvalidHexEscape { position: usize },

    /// Input ends in a lone backslash
    #[error("trailing \\ in string (position {position})")]
    TrailingBackslash { position: usize },
}

impl EscapeError {
    /// Byte offset of the offending backslash in the escaped text
    pub fn position(&self) -> usize {
        match self {
            Self::InvalidHexEscape { position } | Self::TrailingBackslash { position } => *position,
        }
    }
}

/// Result type for escape decoding
pub type EscapeResult<T> = std::result::Result<T, EscapeError>;
