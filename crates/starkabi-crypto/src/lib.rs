//! # starkabi-crypto
//!
//! Hashing for starkabi.
//!
//! - Keccak-256 hashing
//! - Starknet Keccak (Keccak-256 masked to 250 bits), used for selectors
//! - Short 8-byte hashes for interning decoder tables

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;

pub use hash::{keccak256, selector, short_hash, starknet_keccak};
