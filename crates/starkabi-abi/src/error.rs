//! ABI error types

use std::fmt;

use thiserror::Error;

/// Section of an ABI document, used to report where construction failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbiSection {
    /// Struct and enum definitions
    DefinedTypes,
    /// Interface declarations
    Interfaces,
    /// Top-level functions
    Functions,
    /// Events
    Events,
    /// Constructor
    Constructor,
    /// L1 handler
    L1Handler,
    /// Implemented interface cross-references
    ImplementedInterfaces,
}

impl fmt::Display for AbiSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AbiSection::DefinedTypes => "defined types",
            AbiSection::Interfaces => "interfaces",
            AbiSection::Functions => "functions",
            AbiSection::Events => "events",
            AbiSection::Constructor => "constructor",
            AbiSection::L1Handler => "L1 handler",
            AbiSection::ImplementedInterfaces => "implemented interfaces",
        };
        f.write_str(name)
    }
}

/// ABI parsing, decoding and encoding errors
#[derive(Debug, Error)]
pub enum AbiError {
    /// Malformed, ambiguous, duplicate or missing definitions
    #[error("invalid ABI: {0}")]
    InvalidAbi(String),

    /// Buffer underflow, or elements left over after decoding
    #[error("invalid calldata: {0}")]
    InvalidCalldata(String),

    /// Calldata element out of range for its type
    #[error("type decode error: {0}")]
    TypeDecode(String),

    /// Value does not match the shape or range of its type
    #[error("type encode error: {0}")]
    TypeEncode(String),

    /// Document construction failed in a specific section
    #[error("unable to parse {section}: {source}")]
    Section {
        /// Section being parsed
        section: AbiSection,
        /// Underlying failure
        #[source]
        source: Box<AbiError>,
    },

    /// Parser configuration could not be loaded
    #[error("invalid parser config: {0}")]
    Config(String),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AbiError {
    /// Wrap this error with the document section it occurred in
    pub fn in_section(self, section: AbiSection) -> Self {
        AbiError::Section {
            section,
            source: Box::new(self),
        }
    }
}

/// Result type for ABI operations
pub type AbiResult<T> = Result<T, AbiError>;
