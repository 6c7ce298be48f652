//! Keccak-256 based hashing

use sha3::{Digest, Keccak256};
use starkabi_primitives::{Hash32, ShortKey};

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> Hash32 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    Hash32::from_bytes(result.into())
}

/// Keccak-256 masked to its low 250 bits, so the result is always a valid
/// field element
pub fn starknet_keccak(data: &[u8]) -> Hash32 {
    let mut bytes = *keccak256(data).as_bytes();
    bytes[0] &= 0x03;
    Hash32::from_bytes(bytes)
}

/// Selector of a function or event, derived from its name
pub fn selector(name: &str) -> Hash32 {
    starknet_keccak(name.as_bytes())
}

/// 8-byte key derived from a string, for interning decoder tables
pub fn short_hash(id: &str) -> ShortKey {
    keccak256(id.as_bytes()).short_key()
}
