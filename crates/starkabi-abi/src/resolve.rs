//! Struct and enum resolution

use crate::config::ParserConfig;
use crate::entry::{from_entry, TypeDef};
use crate::error::AbiResult;
use crate::graph::topo_sort_type_defs;
use crate::parser::{parse_type, TypeMap};
use crate::types::{AbiParameter, StarknetEnum, StarknetStruct, StarknetType};
use serde_json::Value;

/// Resolve definitions in the order given
///
/// Each definition may only reference types defined before it. Core
/// library definitions (`core::integer`, `core::option`, `Uint256`, ...)
/// are built in and skipped.
pub fn resolve_structs_and_enums(type_defs: &[TypeDef]) -> AbiResult<TypeMap> {
    let mut types = TypeMap::new();

    for def in type_defs {
        if is_builtin_definition(def.name()) {
            continue;
        }

        let members = def
            .members()
            .iter()
            .map(|member| -> AbiResult<AbiParameter> {
                Ok(AbiParameter::new(&member.name, parse_type(&member.ty, &types)?))
            })
            .collect::<AbiResult<Vec<_>>>()?;

        let resolved = match def {
            TypeDef::Struct { name, .. } => StarknetType::Struct(StarknetStruct {
                name: name.clone(),
                members,
            }),
            TypeDef::Enum { name, .. } => StarknetType::Enum(StarknetEnum {
                name: name.clone(),
                variants: members,
            }),
        };
        types.insert(def.name().to_string(), resolved);
    }

    Ok(types)
}

/// Resolve raw struct and enum entries into a type table
///
/// Definitions are first resolved in document order. If that fails and
/// `config.sort_unordered_types` is set, they are sorted by dependency and
/// resolved again.
pub fn resolve_type_defs(entries: &[Value], config: &ParserConfig) -> AbiResult<TypeMap> {
    let type_defs = entries
        .iter()
        .map(from_entry::<TypeDef>)
        .collect::<AbiResult<Vec<_>>>()?;

    match resolve_structs_and_enums(&type_defs) {
        Ok(types) => {
            tracing::debug!("Resolved {} type definitions in order", types.len());
            Ok(types)
        }
        Err(e) if config.sort_unordered_types => {
            tracing::warn!("Type definitions out of order ({}), sorting by dependency", e);
            let sorted = topo_sort_type_defs(&type_defs)?;
            resolve_structs_and_enums(&sorted)
        }
        Err(e) => Err(e),
    }
}

fn is_builtin_definition(name: &str) -> bool {
    if name == "Uint256" {
        return true;
    }
    let mut parts = name.split("::");
    match (parts.next(), parts.next()) {
        (Some("core" | "@core"), Some(module)) => {
            matches!(module, "array" | "integer" | "bool" | "option" | "zeroable")
        }
        _ => false,
    }
}
