//! Calldata encoding

use indexmap::IndexMap;
use num_bigint::{BigUint, Sign};
use num_traits::{One, Zero};
use starkabi_primitives::{parse_hex, max_for_bits};

use crate::error::{AbiError, AbiResult};
use crate::types::{AbiParameter, CoreType, StarknetType};
use crate::value::AbiValue;

/// Encode a scalar, appending its elements to `out`
pub fn encode_core_type(core: CoreType, value: &AbiValue, out: &mut Vec<BigUint>) -> AbiResult<()> {
    match core {
        CoreType::U8
        | CoreType::U16
        | CoreType::U32
        | CoreType::U64
        | CoreType::U128
        | CoreType::U256 => {
            let AbiValue::Int(int) = value else {
                return Err(AbiError::TypeEncode(format!(
                    "cannot encode value {} to {}",
                    value, core
                )));
            };
            let in_range = match int.to_biguint() {
                Some(unsigned) if unsigned <= core.max_value()? => Some(unsigned),
                _ => None,
            };
            let unsigned = in_range.ok_or_else(|| {
                AbiError::TypeEncode(format!("value {} is out of range for {}", int, core))
            })?;

            if core == CoreType::U256 {
                let limb_mask = max_for_bits(128);
                out.push(&unsigned & &limb_mask);
                out.push(unsigned >> 128usize);
            } else {
                out.push(unsigned);
            }
            Ok(())
        }
        CoreType::Bool => match value {
            AbiValue::Bool(b) => {
                out.push(if *b { BigUint::one() } else { BigUint::zero() });
                Ok(())
            }
            other => Err(AbiError::TypeEncode(format!(
                "cannot encode non-boolean value '{}' to {}",
                other, core
            ))),
        },
        CoreType::Felt
        | CoreType::ContractAddress
        | CoreType::ClassHash
        | CoreType::StorageAddress
        | CoreType::EthAddress
        | CoreType::Bytes31 => {
            let unsigned = match value {
                AbiValue::Hex(s) => parse_hex(s).map_err(|e| AbiError::TypeEncode(e.to_string()))?,
                AbiValue::Int(int) if int.sign() != Sign::Minus => int.magnitude().clone(),
                other => {
                    return Err(AbiError::TypeEncode(format!(
                        "cannot encode value {} to {}",
                        other, core
                    )))
                }
            };
            if unsigned > core.max_value()? {
                return Err(AbiError::TypeEncode(format!(
                    "{} does not fit into {}",
                    unsigned, core
                )));
            }
            out.push(unsigned);
            Ok(())
        }
        CoreType::NoneType => Ok(()),
    }
}

/// Encode a value of any type, appending its elements to `out`
pub fn encode_type(ty: &StarknetType, value: &AbiValue, out: &mut Vec<BigUint>) -> AbiResult<()> {
    match ty {
        StarknetType::Core(core) => encode_core_type(*core, value, out),
        StarknetType::Array(inner) => {
            let items = value.as_list().ok_or_else(|| {
                AbiError::TypeEncode(format!("{} cannot be encoded into {}", value, ty))
            })?;
            out.push(BigUint::from(items.len()));
            for item in items {
                encode_type(inner, item, out)?;
            }
            Ok(())
        }
        StarknetType::Option(inner) if inner.may_decode_to_none() => Err(AbiError::TypeEncode(
            format!("ambiguous option type {}", ty),
        )),
        StarknetType::Option(inner) => match value {
            AbiValue::None => {
                out.push(BigUint::one());
                Ok(())
            }
            present => {
                out.push(BigUint::zero());
                encode_type(inner, present, out)
            }
        },
        StarknetType::NonZero(inner) => {
            let start = out.len();
            encode_type(inner, value, out)?;
            let emitted = &out[start..];
            let all_zero = !emitted.is_empty() && emitted.iter().all(Zero::is_zero);
            if value.is_zero_scalar() || all_zero {
                return Err(AbiError::TypeEncode(format!(
                    "zero value {} cannot be encoded into {}",
                    value, ty
                )));
            }
            Ok(())
        }
        StarknetType::Tuple(members) => {
            let items = value
                .as_list()
                .filter(|items| items.len() == members.len())
                .ok_or_else(|| {
                    AbiError::TypeEncode(format!("{} cannot be encoded into {}", value, ty))
                })?;
            for (member, item) in members.iter().zip(items) {
                encode_type(member, item, out)?;
            }
            Ok(())
        }
        StarknetType::Struct(s) => {
            let fields = value
                .as_map()
                .filter(|fields| fields.len() == s.members.len())
                .ok_or_else(|| {
                    AbiError::TypeEncode(format!("{} cannot be encoded into struct {}", value, s.name))
                })?;
            encode_params_into(&s.members, fields, out, AbiError::TypeEncode)
        }
        StarknetType::Enum(e) => {
            let fields = value.as_map().ok_or_else(|| {
                AbiError::TypeEncode(format!("{} cannot be encoded into enum {}", value, e.name))
            })?;
            let (variant_name, payload) = match fields.iter().next() {
                Some(entry) if fields.len() == 1 => entry,
                _ => {
                    return Err(AbiError::TypeEncode(format!(
                        "enum value {} must have exactly one key-value pair",
                        value
                    )))
                }
            };
            let (index, variant) = e.variant(variant_name).ok_or_else(|| {
                AbiError::TypeEncode(format!(
                    "enum key {} not found in enum {}",
                    variant_name, e.name
                ))
            })?;
            out.push(BigUint::from(index));
            encode_type(&variant.ty, payload, out)
        }
    }
}

/// Encode one value per type, in order
pub fn encode_from_types(types: &[StarknetType], values: &[AbiValue]) -> AbiResult<Vec<BigUint>> {
    if types.len() != values.len() {
        return Err(AbiError::InvalidCalldata(format!(
            "number of encode values '{}' does not match number of ABI types '{}'",
            values.len(),
            types.len()
        )));
    }
    let mut out = Vec::new();
    for (ty, value) in types.iter().zip(values) {
        encode_type(ty, value, &mut out)?;
    }
    Ok(out)
}

/// Encode named values in parameter order
///
/// Every parameter must have a value, and no extra values are allowed.
pub fn encode_from_params(
    params: &[AbiParameter],
    values: &IndexMap<String, AbiValue>,
) -> AbiResult<Vec<BigUint>> {
    if params.len() != values.len() {
        return Err(AbiError::InvalidCalldata(format!(
            "number of encode values '{}' does not match number of ABI params '{}'",
            values.len(),
            params.len()
        )));
    }
    let mut out = Vec::new();
    encode_params_into(params, values, &mut out, AbiError::InvalidCalldata)?;
    Ok(out)
}

fn encode_params_into(
    params: &[AbiParameter],
    values: &IndexMap<String, AbiValue>,
    out: &mut Vec<BigUint>,
    missing: fn(String) -> AbiError,
) -> AbiResult<()> {
    for param in params {
        let value = values
            .get(&param.name)
            .ok_or_else(|| missing(format!("missing encode value for param: {}", param.name)))?;
        encode_type(&param.ty, value, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::types::{StarknetEnum, StarknetStruct};

    fn core(core: CoreType) -> StarknetType {
        StarknetType::core(core)
    }

    fn encode_one(ty: &StarknetType, value: AbiValue) -> AbiResult<Vec<BigUint>> {
        encode_from_types(std::slice::from_ref(ty), &[value])
    }

    // ==================== Scalars ====================

    #[test]
    fn test_encode_integer_range() {
        assert_eq!(
            encode_one(&core(CoreType::U64), AbiValue::from(u64::MAX)).unwrap(),
            vec![BigUint::from(u64::MAX)]
        );

        let err = encode_one(&core(CoreType::U64), AbiValue::from(u64::MAX as u128 + 1)).unwrap_err();
        assert!(matches!(err, AbiError::TypeEncode(_)));
        assert!(err
            .to_string()
            .contains("value 18446744073709551616 is out of range for U64"));

        let err = encode_one(&core(CoreType::U8), AbiValue::int(-1)).unwrap_err();
        assert!(err.to_string().contains("out of range for U8"));
    }

    #[test]
    fn test_encode_integer_rejects_hex() {
        assert!(encode_one(&core(CoreType::U32), AbiValue::hex("0x01")).is_err());
    }

    #[test]
    fn test_encode_u256_limbs() {
        let value = (BigUint::from(2u32) << 128usize) + BigUint::from(5u32);
        assert_eq!(
            encode_one(&core(CoreType::U256), AbiValue::from(value)).unwrap(),
            vec![BigUint::from(5u32), BigUint::from(2u32)]
        );
    }

    #[test]
    fn test_encode_bool() {
        assert_eq!(
            encode_one(&core(CoreType::Bool), AbiValue::Bool(true)).unwrap(),
            vec![BigUint::one()]
        );
        let err = encode_one(&core(CoreType::Bool), AbiValue::int(1)).unwrap_err();
        assert!(err.to_string().contains("cannot encode non-boolean value"));
    }

    #[test]
    fn test_encode_felt() {
        assert_eq!(
            encode_one(&core(CoreType::Felt), AbiValue::hex("0x0abc")).unwrap(),
            vec![BigUint::from(0xabcu32)]
        );
        assert_eq!(
            encode_one(&core(CoreType::Felt), AbiValue::int(12)).unwrap(),
            vec![BigUint::from(12u32)]
        );

        let err = encode_one(&core(CoreType::Felt), AbiValue::hex("abc")).unwrap_err();
        assert!(err.to_string().contains("hex strings must be 0x prefixed"));

        for malformed in ["0x1_0", "0x+10", "0x"] {
            let err = encode_one(&core(CoreType::Felt), AbiValue::hex(malformed)).unwrap_err();
            assert!(matches!(err, AbiError::TypeEncode(_)), "{} accepted", malformed);
        }

        let prime = starkabi_primitives::field_prime().clone();
        let err = encode_one(&core(CoreType::Felt), AbiValue::from(prime)).unwrap_err();
        assert!(err.to_string().contains("does not fit into Felt"));
    }

    #[test]
    fn test_encode_eth_address_range() {
        let too_big = BigUint::from(1u32) << 160usize;
        assert!(encode_one(&core(CoreType::EthAddress), AbiValue::from(too_big)).is_err());
    }

    // ==================== Composites ====================

    #[test]
    fn test_encode_array_and_option() {
        let ty = StarknetType::array(StarknetType::option(core(CoreType::U8)));
        let value = AbiValue::Array(vec![AbiValue::from(3u64), AbiValue::None]);
        assert_eq!(
            encode_one(&ty, value).unwrap(),
            vec![
                BigUint::from(2u32),
                BigUint::zero(),
                BigUint::from(3u32),
                BigUint::one()
            ]
        );
    }

    #[test]
    fn test_encode_ambiguous_option_rejected() {
        let nested = StarknetType::option(StarknetType::option(core(CoreType::U8)));
        assert!(matches!(
            encode_one(&nested, AbiValue::None),
            Err(AbiError::TypeEncode(_))
        ));

        let unit = StarknetType::option(core(CoreType::NoneType));
        assert!(matches!(
            encode_one(&unit, AbiValue::None),
            Err(AbiError::TypeEncode(_))
        ));
    }

    #[test]
    fn test_encode_array_rejects_scalar() {
        let err = encode_one(&StarknetType::array(core(CoreType::U8)), AbiValue::from(1u64)).unwrap_err();
        assert!(err.to_string().contains("cannot be encoded into [U8]"));
    }

    #[test]
    fn test_encode_tuple_arity() {
        let ty = StarknetType::Tuple(vec![core(CoreType::U8), core(CoreType::Bool)]);
        assert!(encode_one(&ty, AbiValue::Tuple(vec![AbiValue::from(1u64)])).is_err());
        assert_eq!(
            encode_one(&ty, AbiValue::Array(vec![AbiValue::from(1u64), AbiValue::Bool(false)]))
                .unwrap(),
            vec![BigUint::one(), BigUint::zero()]
        );
    }

    #[test]
    fn test_encode_non_zero() {
        let ty = StarknetType::non_zero(core(CoreType::U32));
        assert!(encode_one(&ty, AbiValue::from(0u64)).is_err());
        assert_eq!(encode_one(&ty, AbiValue::from(4u64)).unwrap(), vec![BigUint::from(4u32)]);
    }

    #[test]
    fn test_encode_enum() {
        let ty = StarknetType::Enum(StarknetEnum {
            name: "demo::Status".to_string(),
            variants: vec![
                AbiParameter::new("Ready", core(CoreType::NoneType)),
                AbiParameter::new("Failed", core(CoreType::Felt)),
            ],
        });
        assert_eq!(
            encode_one(&ty, AbiValue::variant("Failed", AbiValue::hex("0x05"))).unwrap(),
            vec![BigUint::one(), BigUint::from(5u32)]
        );
        assert_eq!(
            encode_one(&ty, AbiValue::variant("Ready", AbiValue::None)).unwrap(),
            vec![BigUint::zero()]
        );

        let err = encode_one(&ty, AbiValue::variant("Missing", AbiValue::None)).unwrap_err();
        assert!(err.to_string().contains("enum key Missing not found in enum demo::Status"));

        let two = AbiValue::fields([("Ready", AbiValue::None), ("Failed", AbiValue::None)]);
        let err = encode_one(&ty, two).unwrap_err();
        assert!(err.to_string().contains("must have exactly one key-value pair"));
    }

    #[test]
    fn test_encode_struct_then_decode() {
        let ty = StarknetType::Struct(StarknetStruct {
            name: "demo::Transfer".to_string(),
            members: vec![
                AbiParameter::new("to", core(CoreType::ContractAddress)),
                AbiParameter::new("amounts", StarknetType::array(core(CoreType::U256))),
            ],
        });
        let value = AbiValue::fields([
            ("to", AbiValue::hex(format!("0x{}", "0".repeat(62) + "7f"))),
            ("amounts", AbiValue::Array(vec![AbiValue::from(u128::MAX)])),
        ]);
        let encoded = encode_one(&ty, value.clone()).unwrap();
        assert_eq!(encoded.len(), 4);
        assert_eq!(decode(&[ty], &encoded).unwrap(), vec![value]);
    }

    #[test]
    fn test_encode_struct_missing_member() {
        let ty = StarknetType::Struct(StarknetStruct {
            name: "demo::Pair".to_string(),
            members: vec![
                AbiParameter::new("a", core(CoreType::U8)),
                AbiParameter::new("b", core(CoreType::U8)),
            ],
        });
        let value = AbiValue::fields([("a", AbiValue::from(1u64)), ("c", AbiValue::from(2u64))]);
        let err = encode_one(&ty, value).unwrap_err();
        assert!(matches!(err, AbiError::TypeEncode(_)));
        assert!(err.to_string().contains("missing encode value for param: b"));
    }

    // ==================== Parameters ====================

    #[test]
    fn test_encode_from_params_arity() {
        let params = vec![AbiParameter::new("amount", core(CoreType::U128))];
        let mut values = IndexMap::new();
        assert!(matches!(
            encode_from_params(&params, &values),
            Err(AbiError::InvalidCalldata(_))
        ));

        values.insert("other".to_string(), AbiValue::from(1u64));
        let err = encode_from_params(&params, &values).unwrap_err();
        assert!(err.to_string().contains("missing encode value for param: amount"));
    }
}
