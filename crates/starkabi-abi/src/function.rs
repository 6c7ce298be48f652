//! Functions and interfaces

use std::fmt;

use indexmap::IndexMap;
use num_bigint::BigUint;
use serde::Serialize;
use starkabi_crypto::selector;
use starkabi_primitives::Hash32;

use crate::decode::{decode_from_params, decode_from_types, Calldata};
use crate::encode::encode_from_params;
use crate::error::AbiResult;
use crate::types::{write_joined, AbiParameter, StarknetType};
use crate::value::AbiValue;

/// A contract function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiFunction {
    /// Function name
    pub name: String,
    /// Name of the ABI this function belongs to
    pub abi_name: String,
    /// Selector, derived from the name
    pub selector: Hash32,
    /// Named inputs
    pub inputs: Vec<AbiParameter>,
    /// Output types
    pub outputs: Vec<StarknetType>,
}

/// Result of decoding a function call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodedFunction {
    /// Name of the ABI the function was found in
    pub abi_name: String,
    /// Function name
    pub name: String,
    /// Decoded inputs by parameter name
    pub inputs: IndexMap<String, AbiValue>,
    /// Decoded outputs, if a result was supplied
    pub outputs: Option<Vec<AbiValue>>,
}

impl AbiFunction {
    /// Create a function, computing its selector
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<AbiParameter>,
        outputs: Vec<StarknetType>,
        abi_name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            selector: selector(&name),
            name,
            abi_name: abi_name.into(),
            inputs,
            outputs,
        }
    }

    /// Canonical shape id, e.g. `Function(a:Felt) -> (Bool)`
    pub fn id_str(&self) -> String {
        function_id_str(&self.inputs, &self.outputs)
    }

    /// Encode named input values into calldata
    pub fn encode(&self, inputs: &IndexMap<String, AbiValue>) -> AbiResult<Vec<BigUint>> {
        encode_from_params(&self.inputs, inputs)
    }

    /// Decode calldata, and the call result if given
    ///
    /// Both buffers must be consumed exactly.
    pub fn decode(
        &self,
        calldata: &[BigUint],
        result: Option<&[BigUint]>,
    ) -> AbiResult<DecodedFunction> {
        let (inputs, outputs) = decode_function_io(&self.inputs, &self.outputs, calldata, result)?;
        Ok(DecodedFunction {
            abi_name: self.abi_name.clone(),
            name: self.name.clone(),
            inputs,
            outputs,
        })
    }
}

/// Canonical shape id of a function signature
pub fn function_id_str(inputs: &[AbiParameter], outputs: &[StarknetType]) -> String {
    struct Id<'a>(&'a [AbiParameter], &'a [StarknetType]);

    impl fmt::Display for Id<'_> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Function(")?;
            write_joined(f, self.0)?;
            f.write_str(") -> (")?;
            write_joined(f, self.1)?;
            f.write_str(")")
        }
    }

    Id(inputs, outputs).to_string()
}

/// Decode function inputs from calldata and outputs from an optional result
pub fn decode_function_io(
    inputs: &[AbiParameter],
    outputs: &[StarknetType],
    calldata: &[BigUint],
    result: Option<&[BigUint]>,
) -> AbiResult<(IndexMap<String, AbiValue>, Option<Vec<AbiValue>>)> {
    let mut cursor = Calldata::new(calldata);
    let decoded_inputs = decode_from_params(inputs, &mut cursor)?;
    cursor.finish()?;

    let decoded_outputs = match result {
        Some(result) => {
            let mut cursor = Calldata::new(result);
            let values = decode_from_types(outputs, &mut cursor)?;
            cursor.finish()?;
            Some(values)
        }
        None => None,
    };

    Ok((decoded_inputs, decoded_outputs))
}

/// A declared interface and its functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiInterface {
    /// Fully qualified interface name
    pub name: String,
    /// Functions in declaration order
    pub functions: Vec<AbiFunction>,
}

impl AbiInterface {
    /// Find a function by name
    pub fn function(&self, name: &str) -> Option<&AbiFunction> {
        self.functions.iter().find(|f| f.name == name)
    }
}
