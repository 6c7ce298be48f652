//! Decoded and encodable values

use std::fmt;

use indexmap::IndexMap;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use starkabi_primitives::parse_hex;

/// A value of some [`StarknetType`](crate::StarknetType)
///
/// Integers decode to [`AbiValue::Int`], felt-like scalars to
/// [`AbiValue::Hex`], structs to [`AbiValue::Struct`] and enums to a
/// single-entry [`AbiValue::Struct`] of variant name to payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// Unsigned integer (signed, so encoding can reject negatives)
    Int(BigInt),
    /// Boolean
    Bool(bool),
    /// `0x`-prefixed hex string
    Hex(String),
    /// Array elements
    Array(Vec<AbiValue>),
    /// Tuple members
    Tuple(Vec<AbiValue>),
    /// Named members of a struct, or the single variant of an enum
    Struct(IndexMap<String, AbiValue>),
    /// Absent option or unit payload
    None,
}

impl AbiValue {
    /// Integer value
    pub fn int(value: impl Into<BigInt>) -> Self {
        AbiValue::Int(value.into())
    }

    /// Hex string value
    pub fn hex(value: impl Into<String>) -> Self {
        AbiValue::Hex(value.into())
    }

    /// Struct value from `(name, value)` pairs
    pub fn fields<K: Into<String>>(pairs: impl IntoIterator<Item = (K, AbiValue)>) -> Self {
        AbiValue::Struct(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Enum value with a single variant
    pub fn variant(name: impl Into<String>, payload: AbiValue) -> Self {
        let mut map = IndexMap::with_capacity(1);
        map.insert(name.into(), payload);
        AbiValue::Struct(map)
    }

    /// Elements of an array or tuple
    pub fn as_list(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(items) | AbiValue::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Members of a struct or enum value
    pub fn as_map(&self) -> Option<&IndexMap<String, AbiValue>> {
        match self {
            AbiValue::Struct(map) => Some(map),
            _ => None,
        }
    }

    /// Numeric value of an integer or hex scalar, if non-negative
    pub fn as_biguint(&self) -> Option<BigUint> {
        match self {
            AbiValue::Int(value) => value.to_biguint(),
            AbiValue::Hex(s) => parse_hex(s).ok(),
            _ => None,
        }
    }

    /// Check if this is a zero integer or hex scalar
    pub fn is_zero_scalar(&self) -> bool {
        match self {
            AbiValue::Int(value) => value.is_zero(),
            AbiValue::Hex(_) => self.as_biguint().map(|v| v.is_zero()).unwrap_or(false),
            _ => false,
        }
    }
}

impl From<u64> for AbiValue {
    fn from(value: u64) -> Self {
        AbiValue::Int(value.into())
    }
}

impl From<u128> for AbiValue {
    fn from(value: u128) -> Self {
        AbiValue::Int(value.into())
    }
}

impl From<BigUint> for AbiValue {
    fn from(value: BigUint) -> Self {
        AbiValue::Int(BigInt::from_biguint(Sign::Plus, value))
    }
}

impl From<bool> for AbiValue {
    fn from(value: bool) -> Self {
        AbiValue::Bool(value)
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Int(value) => write!(f, "{}", value),
            AbiValue::Bool(value) => write!(f, "{}", value),
            AbiValue::Hex(value) => f.write_str(value),
            AbiValue::None => f.write_str("None"),
            other => match serde_json::to_string(other) {
                Ok(json) => f.write_str(&json),
                Err(_) => write!(f, "{:?}", other),
            },
        }
    }
}

impl Serialize for AbiValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AbiValue::Int(value) => match value.to_u64() {
                Some(small) => serializer.serialize_u64(small),
                None => serializer.serialize_str(&value.to_string()),
            },
            AbiValue::Bool(value) => serializer.serialize_bool(*value),
            AbiValue::Hex(value) => serializer.serialize_str(value),
            AbiValue::Array(items) | AbiValue::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            AbiValue::Struct(members) => {
                let mut map = serializer.serialize_map(Some(members.len()))?;
                for (name, value) in members {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            AbiValue::None => serializer.serialize_none(),
        }
    }
}
