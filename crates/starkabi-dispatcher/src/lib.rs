//! # starkabi-dispatcher
//!
//! Registry of parsed ABIs keyed by class hash and selector.
//!
//! Registering an [`AbiDocument`](starkabi_abi::AbiDocument) interns the
//! shape of every function and event into shared decoder tables and
//! records a per-class selector map. Calls and events are then decoded
//! from their raw calldata, result, data and keys.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod dispatcher;
mod error;

pub use dispatcher::{ClassInfo, Dispatcher, DispatchEntry, EventType, FunctionType};
pub use error::{DispatchError, DispatchResult};
