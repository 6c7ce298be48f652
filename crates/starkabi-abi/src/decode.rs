//! Calldata decoding
//!
//! Calldata is a flat sequence of field elements. Decoding walks a
//! [`Calldata`] cursor over the buffer, so the caller's slice is never
//! modified and the number of consumed elements is always known.

use indexmap::IndexMap;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use starkabi_primitives::{
    to_even_hex, to_padded_hex, ADDRESS_HEX_DIGITS, BYTES31_HEX_DIGITS, ETH_ADDRESS_HEX_DIGITS,
};

use crate::error::{AbiError, AbiResult};
use crate::types::{AbiParameter, CoreType, StarknetType};
use crate::value::AbiValue;

/// Read cursor over a calldata buffer
#[derive(Debug, Clone)]
pub struct Calldata<'a> {
    data: &'a [BigUint],
    position: usize,
}

impl<'a> Calldata<'a> {
    /// Create a cursor at the start of `data`
    pub fn new(data: &'a [BigUint]) -> Self {
        Self { data, position: 0 }
    }

    /// Number of elements consumed so far
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of elements not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    /// Check if every element has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Elements consumed since `start`
    fn consumed_since(&self, start: usize) -> &'a [BigUint] {
        &self.data[start..self.position]
    }

    /// Take the next element, failing with an underflow error naming `ty`
    pub fn pop(&mut self, ty: &dyn std::fmt::Display) -> AbiResult<&'a BigUint> {
        let value = self.data.get(self.position).ok_or_else(|| {
            AbiError::InvalidCalldata(format!("not enough calldata to decode {}", ty))
        })?;
        self.position += 1;
        Ok(value)
    }

    /// Fail if any elements remain
    pub fn finish(&self) -> AbiResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AbiError::InvalidCalldata(format!(
                "calldata not fully consumed: {} elements remaining",
                self.remaining()
            )))
        }
    }
}

/// Decode a scalar
pub fn decode_core_type(core: CoreType, calldata: &mut Calldata<'_>) -> AbiResult<AbiValue> {
    match core {
        CoreType::U8 | CoreType::U16 | CoreType::U32 | CoreType::U64 | CoreType::U128 => {
            let value = calldata.pop(&core)?;
            check_range(value, core)?;
            Ok(AbiValue::from(value.clone()))
        }
        CoreType::U256 => {
            let low = calldata.pop(&core)?;
            let high = calldata.pop(&core)?;
            let limb_max = CoreType::U128.max_value()?;
            if *low > limb_max {
                return Err(AbiError::TypeDecode("low Exceeds U128 range".to_string()));
            }
            if *high > limb_max {
                return Err(AbiError::TypeDecode("high Exceeds U128 range".to_string()));
            }
            Ok(AbiValue::from(low + (high << 128usize)))
        }
        CoreType::Bool => {
            let value = calldata.pop(&core)?;
            if value.is_zero() {
                Ok(AbiValue::Bool(false))
            } else if value.is_one() {
                Ok(AbiValue::Bool(true))
            } else {
                Err(AbiError::TypeDecode(format!("invalid Bool value: {}", value)))
            }
        }
        CoreType::Felt => {
            let value = calldata.pop(&core)?;
            check_range(value, core)?;
            Ok(AbiValue::Hex(to_even_hex(value)))
        }
        CoreType::ContractAddress | CoreType::ClassHash | CoreType::StorageAddress => {
            let value = calldata.pop(&core)?;
            check_range(value, core)?;
            Ok(AbiValue::Hex(to_padded_hex(value, ADDRESS_HEX_DIGITS)))
        }
        CoreType::EthAddress => {
            let value = calldata.pop(&core)?;
            check_range(value, core)?;
            Ok(AbiValue::Hex(to_padded_hex(value, ETH_ADDRESS_HEX_DIGITS)))
        }
        CoreType::Bytes31 => {
            let value = calldata.pop(&core)?;
            check_range(value, core)?;
            Ok(AbiValue::Hex(to_padded_hex(value, BYTES31_HEX_DIGITS)))
        }
        CoreType::NoneType => Ok(AbiValue::None),
    }
}

fn check_range(value: &BigUint, core: CoreType) -> AbiResult<()> {
    if *value > core.max_value()? {
        return Err(AbiError::TypeDecode(format!(
            "{} exceeds {} max range",
            value, core
        )));
    }
    Ok(())
}

/// Decode a single value of any type
pub fn decode_type(ty: &StarknetType, calldata: &mut Calldata<'_>) -> AbiResult<AbiValue> {
    match ty {
        StarknetType::Core(core) => decode_core_type(*core, calldata),
        StarknetType::Array(inner) => {
            let len = calldata.pop(ty)?;
            let len = len.to_usize().ok_or_else(|| {
                AbiError::InvalidCalldata(format!("array length {} too large for {}", len, ty))
            })?;
            // Bounded by the remaining felts, zero-width elements included
            if len > calldata.remaining() {
                return Err(AbiError::InvalidCalldata(format!(
                    "array length {} exceeds remaining calldata ({}) for {}",
                    len,
                    calldata.remaining(),
                    ty
                )));
            }
            let mut items = Vec::with_capacity(len);
            for _ in 0..len {
                items.push(decode_type(inner, calldata)?);
            }
            Ok(AbiValue::Array(items))
        }
        StarknetType::Option(inner) => {
            if inner.may_decode_to_none() {
                return Err(AbiError::TypeDecode(format!("ambiguous option type {}", ty)));
            }
            let flag = calldata.pop(ty)?;
            if flag.is_zero() {
                decode_type(inner, calldata)
            } else {
                Ok(AbiValue::None)
            }
        }
        StarknetType::NonZero(inner) => {
            let start = calldata.position();
            let value = decode_type(inner, calldata)?;
            let consumed = calldata.consumed_since(start);
            let all_zero = !consumed.is_empty() && consumed.iter().all(Zero::is_zero);
            if value.is_zero_scalar() || all_zero {
                return Err(AbiError::TypeDecode(format!(
                    "zero value decoded as {}",
                    ty
                )));
            }
            Ok(value)
        }
        StarknetType::Tuple(members) => Ok(AbiValue::Tuple(
            members
                .iter()
                .map(|member| decode_type(member, calldata))
                .collect::<AbiResult<_>>()?,
        )),
        StarknetType::Struct(s) => Ok(AbiValue::Struct(decode_from_params(&s.members, calldata)?)),
        StarknetType::Enum(e) => {
            let tag = calldata.pop(ty)?;
            let (index, variant) = tag
                .to_usize()
                .and_then(|i| e.variants.get(i).map(|v| (i, v)))
                .ok_or_else(|| {
                    AbiError::TypeDecode(format!(
                        "enum index {} out of range for {}",
                        tag, e.name
                    ))
                })?;
            tracing::trace!("Decoding variant {} of {}", index, e.name);
            let payload = decode_type(&variant.ty, calldata)?;
            Ok(AbiValue::variant(&variant.name, payload))
        }
    }
}

/// Decode one value per type, in order
pub fn decode_from_types(
    types: &[StarknetType],
    calldata: &mut Calldata<'_>,
) -> AbiResult<Vec<AbiValue>> {
    types.iter().map(|ty| decode_type(ty, calldata)).collect()
}

/// Decode named parameters, in order
pub fn decode_from_params(
    params: &[AbiParameter],
    calldata: &mut Calldata<'_>,
) -> AbiResult<IndexMap<String, AbiValue>> {
    params
        .iter()
        .map(|param| -> AbiResult<(String, AbiValue)> {
            Ok((param.name.clone(), decode_type(&param.ty, calldata)?))
        })
        .collect()
}

/// Decode values of `types` from `data`, requiring every element be consumed
pub fn decode(types: &[StarknetType], data: &[BigUint]) -> AbiResult<Vec<AbiValue>> {
    let mut calldata = Calldata::new(data);
    let values = decode_from_types(types, &mut calldata)?;
    calldata.finish()?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{StarknetEnum, StarknetStruct};

    fn felts(values: &[u64]) -> Vec<BigUint> {
        values.iter().map(|&v| BigUint::from(v)).collect()
    }

    fn core(core: CoreType) -> StarknetType {
        StarknetType::core(core)
    }

    // ==================== Scalars ====================

    #[test]
    fn test_decode_integers() {
        let data = felts(&[255, 65535, 1]);
        let values = decode(
            &[core(CoreType::U8), core(CoreType::U16), core(CoreType::U64)],
            &data,
        )
        .unwrap();
        assert_eq!(values, vec![AbiValue::from(255u64), AbiValue::from(65535u64), AbiValue::from(1u64)]);
    }

    #[test]
    fn test_decode_integer_out_of_range() {
        let err = decode(&[core(CoreType::U8)], &felts(&[256])).unwrap_err();
        assert!(matches!(err, AbiError::TypeDecode(_)));
        assert!(err.to_string().contains("256 exceeds U8 max range"));
    }

    #[test]
    fn test_decode_u256() {
        let data = felts(&[1, 1]);
        let values = decode(&[core(CoreType::U256)], &data).unwrap();
        assert_eq!(
            values[0],
            AbiValue::from((BigUint::from(1u32) << 128usize) + BigUint::from(1u32))
        );
    }

    #[test]
    fn test_decode_u256_limb_out_of_range() {
        let too_big = BigUint::from(1u32) << 128usize;
        let err = decode(&[core(CoreType::U256)], &[too_big.clone(), BigUint::zero()]).unwrap_err();
        assert!(err.to_string().contains("low Exceeds U128 range"));

        let err = decode(&[core(CoreType::U256)], &[BigUint::zero(), too_big]).unwrap_err();
        assert!(err.to_string().contains("high Exceeds U128 range"));
    }

    #[test]
    fn test_decode_u256_underflow() {
        let err = decode(&[core(CoreType::U256)], &felts(&[1])).unwrap_err();
        assert!(matches!(err, AbiError::InvalidCalldata(_)));
        assert!(err.to_string().contains("not enough calldata to decode U256"));
    }

    #[test]
    fn test_decode_bool() {
        let values = decode(&[core(CoreType::Bool), core(CoreType::Bool)], &felts(&[0, 1])).unwrap();
        assert_eq!(values, vec![AbiValue::Bool(false), AbiValue::Bool(true)]);
        assert!(decode(&[core(CoreType::Bool)], &felts(&[2])).is_err());
    }

    #[test]
    fn test_decode_hex_widths() {
        let data = felts(&[0xabc, 0x1, 0x2, 0x3]);
        let values = decode(
            &[
                core(CoreType::Felt),
                core(CoreType::ContractAddress),
                core(CoreType::EthAddress),
                core(CoreType::Bytes31),
            ],
            &data,
        )
        .unwrap();
        assert_eq!(values[0], AbiValue::hex("0x0abc"));
        assert_eq!(values[1], AbiValue::hex(format!("0x{}1", "0".repeat(63))));
        assert_eq!(values[2], AbiValue::hex(format!("0x{}2", "0".repeat(39))));
        assert_eq!(values[3], AbiValue::hex(format!("0x{}3", "0".repeat(61))));
    }

    #[test]
    fn test_decode_none_type_consumes_nothing() {
        let data = felts(&[]);
        let mut calldata = Calldata::new(&data);
        assert_eq!(
            decode_core_type(CoreType::NoneType, &mut calldata).unwrap(),
            AbiValue::None
        );
        assert_eq!(calldata.position(), 0);
    }

    // ==================== Composites ====================

    #[test]
    fn test_decode_array() {
        let data = felts(&[3, 1, 2, 3]);
        let values = decode(&[StarknetType::array(core(CoreType::U8))], &data).unwrap();
        assert_eq!(
            values[0],
            AbiValue::Array(vec![1u64.into(), 2u64.into(), 3u64.into()])
        );
    }

    #[test]
    fn test_decode_array_length_exceeds_data() {
        let err = decode(&[StarknetType::array(core(CoreType::U8))], &felts(&[5, 1])).unwrap_err();
        assert!(matches!(err, AbiError::InvalidCalldata(_)));
    }

    #[test]
    fn test_decode_zero_width_array_length_bounded() {
        let ty = StarknetType::array(core(CoreType::NoneType));
        let err = decode(&[ty.clone()], &felts(&[10_000_000])).unwrap_err();
        assert!(matches!(err, AbiError::InvalidCalldata(_)));
        assert!(err.to_string().contains("array length 10000000 exceeds remaining calldata"));

        let empty = StarknetType::array(StarknetType::Tuple(vec![]));
        assert!(decode(&[empty], &felts(&[2])).is_err());

        let data = felts(&[2, 0, 0]);
        let mut calldata = Calldata::new(&data);
        let units = decode_type(&ty, &mut calldata).unwrap();
        assert_eq!(units, AbiValue::Array(vec![AbiValue::None, AbiValue::None]));
        assert_eq!(calldata.position(), 1);
    }

    #[test]
    fn test_decode_ambiguous_option_rejected() {
        let nested = StarknetType::option(StarknetType::option(core(CoreType::U8)));
        assert!(matches!(
            decode(&[nested], &felts(&[0, 1])),
            Err(AbiError::TypeDecode(_))
        ));

        let unit = StarknetType::option(core(CoreType::NoneType));
        assert!(matches!(decode(&[unit], &felts(&[0])), Err(AbiError::TypeDecode(_))));
    }

    #[test]
    fn test_decode_option() {
        let ty = StarknetType::option(core(CoreType::U32));
        let values = decode(&[ty.clone(), ty], &felts(&[0, 7, 1])).unwrap();
        assert_eq!(values, vec![AbiValue::from(7u64), AbiValue::None]);
    }

    #[test]
    fn test_decode_non_zero() {
        let ty = StarknetType::non_zero(core(CoreType::U32));
        assert_eq!(decode(&[ty.clone()], &felts(&[9])).unwrap()[0], AbiValue::from(9u64));
        assert!(matches!(
            decode(&[ty], &felts(&[0])),
            Err(AbiError::TypeDecode(_))
        ));
    }

    #[test]
    fn test_decode_non_zero_u256_with_zero_low_limb() {
        let ty = StarknetType::non_zero(core(CoreType::U256));
        let values = decode(&[ty], &felts(&[0, 1])).unwrap();
        assert_eq!(values[0], AbiValue::from(BigUint::from(1u32) << 128usize));
    }

    #[test]
    fn test_decode_struct_and_enum() {
        let point = StarknetType::Struct(StarknetStruct {
            name: "demo::Point".to_string(),
            members: vec![
                AbiParameter::new("x", core(CoreType::U8)),
                AbiParameter::new("y", core(CoreType::U8)),
            ],
        });
        let status = StarknetType::Enum(StarknetEnum {
            name: "demo::Status".to_string(),
            variants: vec![
                AbiParameter::new("Ready", core(CoreType::NoneType)),
                AbiParameter::new("Moved", point.clone()),
            ],
        });

        let values = decode(&[status.clone(), status.clone()], &felts(&[0, 1, 4, 5])).unwrap();
        assert_eq!(values[0], AbiValue::variant("Ready", AbiValue::None));
        assert_eq!(
            values[1],
            AbiValue::variant(
                "Moved",
                AbiValue::fields([("x", AbiValue::from(4u64)), ("y", AbiValue::from(5u64))])
            )
        );

        let err = decode(&[status], &felts(&[2])).unwrap_err();
        assert!(err.to_string().contains("enum index 2 out of range"));
    }

    #[test]
    fn test_decode_requires_full_consumption() {
        let err = decode(&[core(CoreType::U8)], &felts(&[1, 2])).unwrap_err();
        assert!(matches!(err, AbiError::InvalidCalldata(_)));
        assert!(err.to_string().contains("1 elements remaining"));
    }

    #[test]
    fn test_cursor_leaves_input_untouched() {
        let data = felts(&[1, 2, 3]);
        let mut calldata = Calldata::new(&data);
        decode_from_types(&[core(CoreType::U8), core(CoreType::U8)], &mut calldata).unwrap();
        assert_eq!(calldata.position(), 2);
        assert_eq!(calldata.remaining(), 1);
        assert_eq!(data.len(), 3);
    }
}
