//! Starknet ABI type definitions

use std::fmt;

use num_bigint::BigUint;
use starkabi_primitives::{felt_max, max_for_bits};

use crate::error::{AbiError, AbiResult};

/// Scalar types that occupy a fixed number of calldata elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreType {
    /// 8-bit unsigned integer
    U8,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit unsigned integer
    U64,
    /// 128-bit unsigned integer
    U128,
    /// 256-bit unsigned integer, split into two 128-bit limbs
    U256,
    /// Field element
    Felt,
    /// Boolean
    Bool,
    /// Contract address
    ContractAddress,
    /// Class hash
    ClassHash,
    /// Storage address
    StorageAddress,
    /// Ethereum address (160 bits)
    EthAddress,
    /// 31-byte word
    Bytes31,
    /// Unit type, occupies no calldata
    NoneType,
}

impl CoreType {
    /// Map an integer type name (`u8` ... `u256`, case-insensitive)
    pub fn from_int_name(name: &str) -> AbiResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "u8" => Ok(CoreType::U8),
            "u16" => Ok(CoreType::U16),
            "u32" => Ok(CoreType::U32),
            "u64" => Ok(CoreType::U64),
            "u128" => Ok(CoreType::U128),
            "u256" => Ok(CoreType::U256),
            _ => Err(AbiError::InvalidAbi(format!("invalid integer type: {}", name))),
        }
    }

    /// Bit width of integer types
    pub fn int_bits(&self) -> Option<usize> {
        match self {
            CoreType::U8 => Some(8),
            CoreType::U16 => Some(16),
            CoreType::U32 => Some(32),
            CoreType::U64 => Some(64),
            CoreType::U128 => Some(128),
            CoreType::U256 => Some(256),
            _ => None,
        }
    }

    /// Check if this is one of the unsigned integer types
    pub fn is_int(&self) -> bool {
        self.int_bits().is_some()
    }

    /// Largest value a single instance of this type may hold
    pub fn max_value(&self) -> AbiResult<BigUint> {
        if let Some(bits) = self.int_bits() {
            return Ok(max_for_bits(bits));
        }
        match self {
            CoreType::Felt
            | CoreType::ContractAddress
            | CoreType::ClassHash
            | CoreType::StorageAddress => Ok(felt_max().clone()),
            CoreType::EthAddress => Ok(max_for_bits(160)),
            CoreType::Bytes31 => Ok(max_for_bits(248)),
            _ => Err(AbiError::InvalidAbi(format!(
                "cannot get max value for type: {}",
                self.name()
            ))),
        }
    }

    /// Canonical name, also used as the shape id
    pub fn name(&self) -> &'static str {
        match self {
            CoreType::U8 => "U8",
            CoreType::U16 => "U16",
            CoreType::U32 => "U32",
            CoreType::U64 => "U64",
            CoreType::U128 => "U128",
            CoreType::U256 => "U256",
            CoreType::Felt => "Felt",
            CoreType::Bool => "Bool",
            CoreType::ContractAddress => "ContractAddress",
            CoreType::ClassHash => "ClassHash",
            CoreType::StorageAddress => "StorageAddress",
            CoreType::EthAddress => "EthAddress",
            CoreType::Bytes31 => "Bytes31",
            CoreType::NoneType => "NoneType",
        }
    }
}

impl fmt::Display for CoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Named, typed slot: a function input, struct member or enum variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiParameter {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ty: StarknetType,
}

impl AbiParameter {
    /// Create a new parameter
    pub fn new(name: impl Into<String>, ty: StarknetType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

impl fmt::Display for AbiParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.ty)
    }
}

/// Named struct with ordered members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarknetStruct {
    /// Fully qualified type name
    pub name: String,
    /// Members in declaration order
    pub members: Vec<AbiParameter>,
}

/// Named enum with ordered variants; a variant's index is its wire tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarknetEnum {
    /// Fully qualified type name
    pub name: String,
    /// Variants in declaration order
    pub variants: Vec<AbiParameter>,
}

impl StarknetEnum {
    /// Find a variant by name, returning its index
    pub fn variant(&self, name: &str) -> Option<(usize, &AbiParameter)> {
        self.variants
            .iter()
            .enumerate()
            .find(|(_, variant)| variant.name == name)
    }
}

/// A parsed Starknet ABI type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarknetType {
    /// Scalar
    Core(CoreType),
    /// `Array<T>` or `Span<T>`, length-prefixed
    Array(Box<StarknetType>),
    /// `Option<T>`, flag-prefixed
    Option(Box<StarknetType>),
    /// `NonZero<T>`
    NonZero(Box<StarknetType>),
    /// Anonymous tuple
    Tuple(Vec<StarknetType>),
    /// User-defined struct
    Struct(StarknetStruct),
    /// User-defined enum
    Enum(StarknetEnum),
}

impl StarknetType {
    /// Shorthand for a scalar type
    pub const fn core(core: CoreType) -> Self {
        StarknetType::Core(core)
    }

    /// Shorthand for an array of `inner`
    pub fn array(inner: StarknetType) -> Self {
        StarknetType::Array(Box::new(inner))
    }

    /// Shorthand for an option of `inner`
    pub fn option(inner: StarknetType) -> Self {
        StarknetType::Option(Box::new(inner))
    }

    /// Shorthand for a non-zero wrapper of `inner`
    pub fn non_zero(inner: StarknetType) -> Self {
        StarknetType::NonZero(Box::new(inner))
    }

    /// Check if this is the unit type
    pub fn is_none_type(&self) -> bool {
        matches!(self, StarknetType::Core(CoreType::NoneType))
    }

    /// Check if a value of this type can decode to [`AbiValue::None`]
    ///
    /// Such a type cannot be the payload of an option: a present payload
    /// would be indistinguishable from an absent one.
    ///
    /// [`AbiValue::None`]: crate::AbiValue::None
    pub fn may_decode_to_none(&self) -> bool {
        match self {
            StarknetType::Core(CoreType::NoneType) | StarknetType::Option(_) => true,
            StarknetType::NonZero(inner) => inner.may_decode_to_none(),
            _ => false,
        }
    }

    /// Canonical shape string
    ///
    /// Two types with the same id encode and decode identically; struct and
    /// enum names are not part of it.
    pub fn id_str(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for StarknetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StarknetType::Core(core) => write!(f, "{}", core),
            StarknetType::Array(inner) => write!(f, "[{}]", inner),
            StarknetType::Option(inner) => write!(f, "Option[{}]", inner),
            StarknetType::NonZero(inner) => write!(f, "NonZero[{}]", inner),
            StarknetType::Tuple(members) => {
                f.write_str("(")?;
                write_joined(f, members)?;
                f.write_str(")")
            }
            StarknetType::Struct(s) => {
                f.write_str("{")?;
                write_joined(f, &s.members)?;
                f.write_str("}")
            }
            StarknetType::Enum(e) => {
                f.write_str("Enum[")?;
                for (i, variant) in e.variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    if variant.ty.is_none_type() {
                        f.write_str(&variant.name)?;
                    } else {
                        write!(f, "{}", variant)?;
                    }
                }
                f.write_str("]")
            }
        }
    }
}

/// Write items separated by commas
pub(crate) fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== CoreType ====================

    #[test]
    fn test_from_int_name() {
        assert_eq!(CoreType::from_int_name("u8").unwrap(), CoreType::U8);
        assert_eq!(CoreType::from_int_name("U128").unwrap(), CoreType::U128);
        assert_eq!(CoreType::from_int_name("u256").unwrap(), CoreType::U256);

        let err = CoreType::from_int_name("u512").unwrap_err();
        assert!(err.to_string().contains("invalid integer type: u512"));
    }

    #[test]
    fn test_max_value() {
        assert_eq!(CoreType::U8.max_value().unwrap(), BigUint::from(255u32));
        assert_eq!(CoreType::U64.max_value().unwrap(), BigUint::from(u64::MAX));
        assert_eq!(CoreType::Felt.max_value().unwrap(), *felt_max());
        assert_eq!(CoreType::ClassHash.max_value().unwrap(), *felt_max());
        assert_eq!(CoreType::EthAddress.max_value().unwrap(), max_for_bits(160));
        assert_eq!(CoreType::Bytes31.max_value().unwrap(), max_for_bits(248));
        assert!(CoreType::Bool.max_value().is_err());
        assert!(CoreType::NoneType.max_value().is_err());
    }

    // ==================== Shape ids ====================

    #[test]
    fn test_id_str_wrappers() {
        assert_eq!(StarknetType::core(CoreType::U8).id_str(), "U8");
        assert_eq!(StarknetType::array(StarknetType::core(CoreType::Felt)).id_str(), "[Felt]");
        assert_eq!(StarknetType::option(StarknetType::core(CoreType::U8)).id_str(), "Option[U8]");
        assert_eq!(
            StarknetType::non_zero(StarknetType::core(CoreType::U32)).id_str(),
            "NonZero[U32]"
        );
        assert_eq!(
            StarknetType::Tuple(vec![
                StarknetType::core(CoreType::U16),
                StarknetType::core(CoreType::U32)
            ])
            .id_str(),
            "(U16,U32)"
        );
    }

    #[test]
    fn test_id_str_struct_and_enum() {
        let s = StarknetType::Struct(StarknetStruct {
            name: "Test".to_string(),
            members: vec![
                AbiParameter::new("field1", StarknetType::core(CoreType::U8)),
                AbiParameter::new("field2", StarknetType::core(CoreType::Felt)),
            ],
        });
        assert_eq!(s.id_str(), "{field1:U8,field2:Felt}");

        let e = StarknetType::Enum(StarknetEnum {
            name: "TestEnum".to_string(),
            variants: vec![
                AbiParameter::new("Variant1", StarknetType::core(CoreType::U16)),
                AbiParameter::new("Variant2", StarknetType::core(CoreType::NoneType)),
            ],
        });
        assert_eq!(e.id_str(), "Enum[Variant1:U16,Variant2]");
    }

    #[test]
    fn test_parameter_display() {
        let param = AbiParameter::new("param1", StarknetType::core(CoreType::Felt));
        assert_eq!(param.to_string(), "param1:Felt");
    }

    #[test]
    fn test_enum_variant_lookup() {
        let e = StarknetEnum {
            name: "Status".to_string(),
            variants: vec![
                AbiParameter::new("Ready", StarknetType::core(CoreType::NoneType)),
                AbiParameter::new("Failed", StarknetType::core(CoreType::Felt)),
            ],
        };
        assert_eq!(e.variant("Failed").map(|(i, _)| i), Some(1));
        assert!(e.variant("Missing").is_none());
    }
}
