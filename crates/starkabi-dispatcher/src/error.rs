//! Dispatcher error types

use starkabi_abi::AbiError;
use starkabi_primitives::Hash32;
use thiserror::Error;

/// Dispatcher errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No ABI registered for the class
    #[error("class not found: {0}")]
    ClassNotFound(Hash32),

    /// Class has no function with the selector
    #[error("function {selector} not found in class {class_hash}")]
    FunctionNotFound {
        /// Class that was searched
        class_hash: Hash32,
        /// Function selector
        selector: Hash32,
    },

    /// Class has no event with the selector
    #[error("event {selector} not found in class {class_hash}")]
    EventNotFound {
        /// Class that was searched
        class_hash: Hash32,
        /// Event selector
        selector: Hash32,
    },

    /// Payload could not be dispatched
    #[error("dispatcher decode error: {0}")]
    Decode(String),

    /// Payload did not match the registered types
    #[error(transparent)]
    Abi(#[from] AbiError),
}

/// Result type for dispatcher operations
pub type DispatchResult<T> = Result<T, DispatchError>;
