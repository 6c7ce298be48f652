//! Type-string parsing
//!
//! Turns ABI type strings such as `core::array::Span::<core::felt252>`,
//! `(core::felt252, core::bool)` or the legacy `felt*` into
//! [`StarknetType`] values. Named structs and enums are looked up in a
//! table of already-resolved custom types.

use indexmap::IndexMap;

use crate::error::{AbiError, AbiResult};
use crate::types::{CoreType, StarknetType};

/// Resolved custom types, keyed by fully qualified name
pub type TypeMap = IndexMap<String, StarknetType>;

/// Parse a type string into a [`StarknetType`]
///
/// A leading `@` (snapshot) is ignored. `()` is the unit type.
pub fn parse_type(type_str: &str, custom_types: &TypeMap) -> AbiResult<StarknetType> {
    let s = strip_snapshot(type_str.trim());

    if s == "()" {
        return Ok(StarknetType::core(CoreType::NoneType));
    }
    // Cairo 0 pointer, valid after any type including tuples
    if let Some(inner) = s.strip_suffix('*') {
        return Ok(StarknetType::array(parse_type(inner, custom_types)?));
    }
    if s.starts_with('(') {
        return parse_tuple(s, custom_types);
    }
    if let Some(core) = core_type_from_path(s) {
        return Ok(StarknetType::core(core));
    }

    if let Some((wrapper, inner)) = split_generic(s) {
        match wrapper {
            GenericWrapper::Array => return Ok(StarknetType::array(parse_type(inner, custom_types)?)),
            GenericWrapper::Option => {
                let inner = parse_type(inner, custom_types)?;
                if inner.may_decode_to_none() {
                    return Err(AbiError::InvalidAbi(format!(
                        "Option payload {} is ambiguous with an absent value: {}",
                        inner, s
                    )));
                }
                return Ok(StarknetType::option(inner));
            }
            GenericWrapper::NonZero => {
                return Ok(StarknetType::non_zero(parse_type(inner, custom_types)?))
            }
            GenericWrapper::Other => {}
        }
    }

    if let Some(custom) = custom_types.get(s) {
        return Ok(custom.clone());
    }

    // Cairo 0 spellings
    match s {
        "felt" => return Ok(StarknetType::core(CoreType::Felt)),
        "Uint256" => return Ok(StarknetType::core(CoreType::U256)),
        _ => {}
    }

    Err(AbiError::InvalidAbi(format!("Invalid ABI type: {}", s)))
}

/// Parse a parenthesized tuple type string
///
/// Members are split on top-level commas; nested tuples and generic
/// arguments are kept intact and parsed recursively. Cairo 0 named tuples
/// (`(x: felt, y: felt)`) have their member names dropped.
pub fn parse_tuple(type_str: &str, custom_types: &TypeMap) -> AbiResult<StarknetType> {
    let s = type_str.trim();
    let inner = s
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| AbiError::InvalidAbi(format!("Invalid tuple type: {}", s)))?;

    if inner.trim().is_empty() {
        return Ok(StarknetType::Tuple(Vec::new()));
    }

    let members = split_top_level(inner)
        .ok_or_else(|| AbiError::InvalidAbi(format!("Unbalanced tuple type: {}", s)))?
        .into_iter()
        .map(|member| parse_type(strip_member_name(member), custom_types))
        .collect::<AbiResult<Vec<_>>>()?;

    Ok(StarknetType::Tuple(members))
}

/// Map a fully qualified core path to its scalar type
pub fn core_type_from_path(path: &str) -> Option<CoreType> {
    let rest = path.strip_prefix("core::")?;
    match rest {
        "felt252" => Some(CoreType::Felt),
        "bool" => Some(CoreType::Bool),
        "starknet::contract_address::ContractAddress" => Some(CoreType::ContractAddress),
        "starknet::class_hash::ClassHash" => Some(CoreType::ClassHash),
        "starknet::eth_address::EthAddress" => Some(CoreType::EthAddress),
        "starknet::storage_access::StorageAddress" => Some(CoreType::StorageAddress),
        "bytes_31::bytes31" => Some(CoreType::Bytes31),
        _ => rest
            .strip_prefix("integer::")
            .and_then(|name| CoreType::from_int_name(name).ok()),
    }
}

/// Built-in generic containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GenericWrapper {
    Array,
    Option,
    NonZero,
    Other,
}

/// Split `path::<inner>` into its wrapper kind and inner type string
pub(crate) fn split_generic(s: &str) -> Option<(GenericWrapper, &str)> {
    let open = s.find('<')?;
    let inner = s.strip_suffix('>')?.get(open + 1..)?;
    let path = s[..open].trim_end_matches("::");
    let path = path.strip_prefix("core::").unwrap_or(path);

    let wrapper = match path {
        "array::Array" | "array::Span" => GenericWrapper::Array,
        "option::Option" => GenericWrapper::Option,
        "zeroable::NonZero" => GenericWrapper::NonZero,
        _ => GenericWrapper::Other,
    };
    Some((wrapper, inner))
}

pub(crate) fn strip_snapshot(s: &str) -> &str {
    s.strip_prefix('@').unwrap_or(s).trim()
}

/// Split on commas that are not nested inside parentheses or angle brackets
///
/// Returns `None` if the brackets are unbalanced.
pub(crate) fn split_top_level(s: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth: i32 = 0;
    let mut start = 0;

    for (i, c) in s.char_indices() {
        match c {
            '(' | '<' => depth += 1,
            ')' | '>' => {
                depth -= 1;
                if depth < 0 {
                    return None;
                }
            }
            ',' if depth == 0 => {
                parts.push(s[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }

    let last = s[start..].trim();
    if !last.is_empty() {
        parts.push(last);
    }
    Some(parts)
}

/// Drop a `name:` prefix from a named tuple member
///
/// Only a single top-level colon counts; `::` path separators do not.
pub(crate) fn strip_member_name(member: &str) -> &str {
    let bytes = member.as_bytes();
    let mut depth = 0;

    for (i, &b) in bytes.iter().enumerate() {
        match b {
            b'(' | b'<' => depth += 1,
            b')' | b'>' => depth -= 1,
            b':' if depth == 0 => {
                let prev_colon = i > 0 && bytes[i - 1] == b':';
                let next_colon = bytes.get(i + 1) == Some(&b':');
                if !prev_colon && !next_colon {
                    return member[i + 1..].trim();
                }
            }
            _ => {}
        }
    }
    member
}
