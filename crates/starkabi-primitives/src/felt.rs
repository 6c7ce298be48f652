//! Field-element constants and hex helpers
//!
//! Every value on the wire is a field element: a non-negative integer
//! strictly below the prime `P = 2^251 + 17·2^192 + 1`.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::One;

use crate::error::{PrimitiveError, PrimitiveResult};

static FIELD_PRIME: OnceLock<BigUint> = OnceLock::new();
static FELT_MAX: OnceLock<BigUint> = OnceLock::new();

/// The field prime `2^251 + 17·2^192 + 1`
pub fn field_prime() -> &'static BigUint {
    FIELD_PRIME.get_or_init(|| {
        (BigUint::one() << 251usize) + (BigUint::from(17u32) << 192usize) + BigUint::one()
    })
}

/// Largest valid field element (`P - 1`)
pub fn felt_max() -> &'static BigUint {
    FELT_MAX.get_or_init(|| field_prime() - BigUint::one())
}

/// Largest value representable in `bits` bits (`2^bits - 1`)
pub fn max_for_bits(bits: usize) -> BigUint {
    (BigUint::one() << bits) - BigUint::one()
}

/// Render as `0x`-prefixed lowercase hex, left-padded with zeros to at
/// least `digits` hex digits
pub fn to_padded_hex(value: &BigUint, digits: usize) -> String {
    format!("0x{:0width$x}", value, width = digits)
}

/// Render as `0x`-prefixed lowercase hex with an even number of digits
pub fn to_even_hex(value: &BigUint) -> String {
    let digits = format!("{:x}", value);
    if digits.len() % 2 == 1 {
        format!("0x0{}", digits)
    } else {
        format!("0x{}", digits)
    }
}

/// Parse a `0x`-prefixed hex string into an unbounded integer
///
/// The prefix is mandatory and every remaining character must be a hex
/// digit.
pub fn parse_hex(s: &str) -> PrimitiveResult<BigUint> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| PrimitiveError::MissingHexPrefix(s.to_string()))?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PrimitiveError::InvalidHex(s.to_string()));
    }

    BigUint::parse_bytes(digits.as_bytes(), 16)
        .ok_or_else(|| PrimitiveError::InvalidHex(s.to_string()))
}
