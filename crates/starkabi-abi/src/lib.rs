//! # starkabi-abi
//!
//! Starknet ABI type model, parser and calldata codec.
//!
//! ## Features
//!
//! - **Types**: [`StarknetType`] and [`CoreType`], with canonical shape ids
//! - **Parser**: type strings to types, including Cairo 0 spellings
//! - **Resolver**: struct and enum definitions in any declaration order
//! - **Codec**: calldata decoding and encoding with exact range checks
//! - **Documents**: [`AbiDocument`] with functions, events, constructor,
//!   L1 handler and implemented interfaces
//!
//! ## Example
//!
//! ```rust
//! use starkabi_abi::{decode, parse_type, AbiValue, BigUint, TypeMap};
//!
//! let ty = parse_type("core::array::Span::<core::integer::u8>", &TypeMap::new()).unwrap();
//! let calldata = [BigUint::from(2u32), BigUint::from(7u32), BigUint::from(9u32)];
//!
//! let values = decode(&[ty], &calldata).unwrap();
//! assert_eq!(values[0], AbiValue::Array(vec![7u64.into(), 9u64.into()]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod decode;
pub mod document;
pub mod encode;
pub mod entry;
pub mod error;
pub mod event;
pub mod function;
pub mod graph;
pub mod parser;
pub mod resolve;
pub mod types;
pub mod value;

pub use config::ParserConfig;
pub use decode::{decode, decode_core_type, decode_from_params, decode_from_types, decode_type, Calldata};
pub use document::AbiDocument;
pub use encode::{encode_core_type, encode_from_params, encode_from_types, encode_type};
pub use entry::{group_by_member_kind, GroupedAbi, MemberKind, RawMember, TypeDef};
pub use error::{AbiError, AbiResult, AbiSection};
pub use event::{decode_event_fields, event_id_str, AbiEvent, DecodedEvent};
pub use function::{decode_function_io, function_id_str, AbiFunction, AbiInterface, DecodedFunction};
pub use graph::{build_type_graph, topo_sort_type_defs, TypeGraph};
pub use parser::{parse_tuple, parse_type, TypeMap};
pub use resolve::{resolve_structs_and_enums, resolve_type_defs};
pub use types::{AbiParameter, CoreType, StarknetEnum, StarknetStruct, StarknetType};
pub use value::AbiValue;

pub use starkabi_primitives::{BigInt, BigUint, Hash32};
