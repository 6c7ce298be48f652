//! Events

use std::fmt;

use indexmap::IndexMap;
use num_bigint::BigUint;
use serde::Serialize;
use starkabi_crypto::selector;
use starkabi_primitives::Hash32;

use crate::decode::{decode_type, Calldata};
use crate::error::{AbiError, AbiResult};
use crate::types::StarknetType;
use crate::value::AbiValue;

/// A contract event
///
/// Key parameters are decoded from the event keys (after the leading
/// selector key), data parameters from the event data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiEvent {
    /// Event name
    pub name: String,
    /// Name of the ABI this event belongs to
    pub abi_name: String,
    /// Selector, derived from the name
    pub selector: Hash32,
    /// Parameter names in declaration order
    pub parameters: Vec<String>,
    /// Parameters carried in the keys
    pub keys: IndexMap<String, StarknetType>,
    /// Parameters carried in the data
    pub data: IndexMap<String, StarknetType>,
}

/// Result of decoding an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedEvent {
    /// Name of the ABI the event was found in
    pub abi_name: String,
    /// Event name
    pub name: String,
    /// Decoded parameters in declaration order
    pub data: IndexMap<String, AbiValue>,
}

impl AbiEvent {
    /// Create an event, computing its selector
    ///
    /// Every parameter must appear in exactly one of `keys` and `data`.
    pub fn new(
        name: impl Into<String>,
        parameters: Vec<String>,
        data: IndexMap<String, StarknetType>,
        keys: IndexMap<String, StarknetType>,
        abi_name: impl Into<String>,
    ) -> AbiResult<Self> {
        let name = name.into();
        check_event_parameters(&name, &parameters, &keys, &data)?;

        Ok(Self {
            selector: selector(&name),
            name,
            abi_name: abi_name.into(),
            parameters,
            keys,
            data,
        })
    }

    /// Canonical shape id; key parameters are written as `<name>`
    pub fn id_str(&self) -> String {
        event_id_str(&self.parameters, &self.keys, &self.data)
    }

    /// Decode an emitted event
    ///
    /// `keys[0]` is the event selector and is skipped. Both buffers must be
    /// consumed exactly.
    pub fn decode(&self, data: &[BigUint], keys: &[BigUint]) -> AbiResult<DecodedEvent> {
        let decoded = decode_event_fields(&self.parameters, &self.keys, &self.data, data, keys)?;
        Ok(DecodedEvent {
            abi_name: self.abi_name.clone(),
            name: self.name.clone(),
            data: decoded,
        })
    }
}

fn check_event_parameters(
    name: &str,
    parameters: &[String],
    keys: &IndexMap<String, StarknetType>,
    data: &IndexMap<String, StarknetType>,
) -> AbiResult<()> {
    for param in parameters {
        if keys.contains_key(param) == data.contains_key(param) {
            return Err(AbiError::InvalidAbi(format!(
                "event parameter {} of {} must be exactly one of key or data",
                param, name
            )));
        }
    }
    if keys.len() + data.len() != parameters.len() {
        return Err(AbiError::InvalidAbi(format!(
            "event {} has keys or data not listed as parameters",
            name
        )));
    }
    Ok(())
}

/// Canonical shape id of an event signature
pub fn event_id_str(
    parameters: &[String],
    keys: &IndexMap<String, StarknetType>,
    data: &IndexMap<String, StarknetType>,
) -> String {
    struct Id<'a> {
        parameters: &'a [String],
        keys: &'a IndexMap<String, StarknetType>,
        data: &'a IndexMap<String, StarknetType>,
    }

    impl fmt::Display for Id<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Event(")?;
            for (i, param) in self.parameters.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                if let Some(ty) = self.keys.get(param) {
                    write!(f, "<{}>:{}", param, ty)?;
                } else if let Some(ty) = self.data.get(param) {
                    write!(f, "{}:{}", param, ty)?;
                }
            }
            f.write_str(")")
        }
    }

    Id {
        parameters,
        keys,
        data,
    }
    .to_string()
}

/// Decode event parameters from the data and keys buffers
pub fn decode_event_fields(
    parameters: &[String],
    key_types: &IndexMap<String, StarknetType>,
    data_types: &IndexMap<String, StarknetType>,
    data: &[BigUint],
    keys: &[BigUint],
) -> AbiResult<IndexMap<String, AbiValue>> {
    let (_selector, keys) = keys.split_first().ok_or_else(|| {
        AbiError::InvalidCalldata("event keys must start with the event selector".to_string())
    })?;

    let mut data_cursor = Calldata::new(data);
    let mut key_cursor = Calldata::new(keys);
    let mut decoded = IndexMap::with_capacity(parameters.len());

    for param in parameters {
        let value = if let Some(ty) = data_types.get(param) {
            decode_type(ty, &mut data_cursor)?
        } else if let Some(ty) = key_types.get(param) {
            decode_type(ty, &mut key_cursor)?
        } else {
            return Err(AbiError::TypeDecode(format!(
                "event parameter {} not present in keys or data",
                param
            )));
        };
        decoded.insert(param.clone(), value);
    }

    data_cursor.finish()?;
    key_cursor.finish()?;
    Ok(decoded)
}
