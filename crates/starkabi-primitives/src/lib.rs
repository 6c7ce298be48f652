//! # starkabi-primitives
//!
//! Primitive types shared by the starkabi crates.
//!
//! This crate provides the field-element constants and value helpers the
//! ABI codec is built on:
//! - [`Hash32`]: 32-byte big-endian values (class hashes, selectors)
//! - field prime and per-type maxima
//! - zero-padded hex rendering and strict hex parsing

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod felt;
mod hash;

pub use error::{PrimitiveError, PrimitiveResult};
pub use felt::{
    felt_max, field_prime, max_for_bits, parse_hex, to_even_hex, to_padded_hex,
};
pub use hash::{Hash32, ShortKey};

// Re-export the big integer types used for calldata
pub use num_bigint::{BigInt, BigUint};

/// Number of hex digits used to render contract addresses, class hashes
/// and storage addresses
pub const ADDRESS_HEX_DIGITS: usize = 64;

/// Number of hex digits used to render Ethereum addresses
pub const ETH_ADDRESS_HEX_DIGITS: usize = 40;

/// Number of hex digits used to render `bytes31` values
pub const BYTES31_HEX_DIGITS: usize = 62;
