//! 32-byte values (class hashes, selectors)

use std::fmt;

use num_bigint::BigUint;

use crate::error::{PrimitiveError, PrimitiveResult};

/// 8-byte dispatch key taken from the low-order end of a [`Hash32`]
pub type ShortKey = [u8; 8];

/// 256-bit big-endian value
///
/// Used for class hashes and function/event selectors. Field elements
/// always fit, so conversion from calldata is lossless.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Hash32([u8; 32]);

impl Hash32 {
    /// Size in bytes
    pub const LEN: usize = 32;

    /// Zero value
    pub const ZERO: Hash32 = Hash32([0u8; 32]);

    /// Create from bytes
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Hash32(bytes)
    }

    /// Create from a big-endian slice of at most 32 bytes, left-padding
    /// with zeros
    pub fn from_slice(slice: &[u8]) -> PrimitiveResult<Self> {
        if slice.len() > Self::LEN {
            return Err(PrimitiveError::InvalidLength {
                expected: Self::LEN,
                got: slice.len(),
            });
        }
        let mut bytes = [0u8; 32];
        bytes[Self::LEN - slice.len()..].copy_from_slice(slice);
        Ok(Hash32(bytes))
    }

    /// Parse from hex string, with or without `0x` prefix
    ///
    /// Short values (e.g. `0x1234`) are left-padded.
    pub fn from_hex(s: &str) -> PrimitiveResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let padded;
        let digits = if s.len() % 2 == 1 {
            padded = format!("0{}", s);
            padded.as_str()
        } else {
            s
        };
        let bytes = hex::decode(digits).map_err(|e| PrimitiveError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Convert from an unbounded integer
    pub fn from_biguint(value: &BigUint) -> PrimitiveResult<Self> {
        Self::from_slice(&value.to_bytes_be())
    }

    /// Convert to an unbounded integer
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0)
    }

    /// Get as bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Low-order 8 bytes, used as the dispatch key for classes and selectors
    pub fn short_key(&self) -> ShortKey {
        let mut key = [0u8; 8];
        key.copy_from_slice(&self.0[24..]);
        key
    }

    /// Convert to hex string (64 digits)
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", self.to_hex())
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Hash32 {
    fn from(bytes: [u8; 32]) -> Self {
        Hash32(bytes)
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de::Error, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Hash32 {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_hex())
        }
    }

    impl<'de> Deserialize<'de> for Hash32 {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Hash32::from_hex(&s).map_err(D::Error::custom)
        }
    }
}
