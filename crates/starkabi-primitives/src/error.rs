//! Common error types for primitives

use thiserror::Error;

/// Primitive operation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Hex string without the `0x` prefix
    #[error("hex strings must be 0x prefixed: {0}")]
    MissingHexPrefix(String),

    /// Invalid length
    #[error("invalid length: expected at most {expected} bytes, got {got}")]
    InvalidLength {
        /// Maximum accepted length
        expected: usize,
        /// Actual length
        got: usize,
    },
}

/// Result type for primitive operations
pub type PrimitiveResult<T> = Result<T, PrimitiveError>;
