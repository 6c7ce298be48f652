//! ABI document builder
//!
//! Assembles a parsed contract interface from raw ABI JSON: type
//! definitions are resolved first, then interfaces, functions, events,
//! the constructor, the L1 handler and implemented interfaces. Failures
//! are reported against the section they occurred in.

use indexmap::IndexMap;
use serde_json::Value;
use starkabi_primitives::Hash32;

use crate::config::ParserConfig;
use crate::entry::{
    from_entry, group_by_member_kind, RawEvent, RawFunction, RawImpl, RawInterface, RawMember,
};
use crate::error::{AbiError, AbiResult, AbiSection};
use crate::event::AbiEvent;
use crate::function::{AbiFunction, AbiInterface};
use crate::parser::{parse_type, TypeMap};
use crate::resolve::resolve_type_defs;
use crate::types::{AbiParameter, StarknetType};

/// A fully parsed contract ABI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiDocument {
    /// ABI name
    pub name: String,
    /// Class hash of the contract
    pub class_hash: Hash32,
    /// Functions by name, including those declared in interfaces
    pub functions: IndexMap<String, AbiFunction>,
    /// Events by name
    pub events: IndexMap<String, AbiEvent>,
    /// Constructor inputs, if exactly one constructor is declared
    pub constructor: Option<Vec<AbiParameter>>,
    /// L1 handler, if exactly one is declared
    pub l1_handler: Option<AbiFunction>,
    /// Interfaces referenced by an `impl` entry
    pub implemented_interfaces: IndexMap<String, AbiInterface>,
}

impl AbiDocument {
    /// Build from a parsed JSON array with the default [`ParserConfig`]
    pub fn from_json(json: &Value, name: &str, class_hash: Hash32) -> AbiResult<Self> {
        Self::from_json_with_config(json, name, class_hash, &ParserConfig::default())
    }

    /// Build from a JSON string with the default [`ParserConfig`]
    pub fn from_json_str(json: &str, name: &str, class_hash: Hash32) -> AbiResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_json(&value, name, class_hash)
    }

    /// Build from a parsed JSON array
    pub fn from_json_with_config(
        json: &Value,
        name: &str,
        class_hash: Hash32,
        config: &ParserConfig,
    ) -> AbiResult<Self> {
        let entries = json
            .as_array()
            .ok_or_else(|| AbiError::InvalidAbi("ABI must be a JSON array".to_string()))?;
        let grouped = group_by_member_kind(entries)?;

        let types = resolve_type_defs(&grouped.type_defs, config)
            .map_err(|e| e.in_section(AbiSection::DefinedTypes))?;

        let interfaces = grouped
            .interfaces
            .iter()
            .map(|entry| parse_interface(entry, &types, name))
            .collect::<AbiResult<Vec<_>>>()
            .map_err(|e| e.in_section(AbiSection::Interfaces))?;

        let mut functions = IndexMap::new();
        for entry in &grouped.functions {
            let function =
                parse_function(entry, &types, name).map_err(|e| e.in_section(AbiSection::Functions))?;
            functions.insert(function.name.clone(), function);
        }
        for function in interfaces.iter().flat_map(|iface| &iface.functions) {
            functions.insert(function.name.clone(), function.clone());
        }

        let mut events = IndexMap::new();
        for entry in &grouped.events {
            let event = parse_event(entry, &types, name, config)
                .map_err(|e| e.in_section(AbiSection::Events))?;
            if let Some(event) = event {
                events.insert(event.name.clone(), event);
            }
        }

        let constructor = match grouped.constructors.as_slice() {
            [entry] => Some(
                from_entry::<RawFunction>(entry)
                    .and_then(|raw| parse_parameters(&raw.inputs, &types))
                    .map_err(|e| e.in_section(AbiSection::Constructor))?,
            ),
            _ => None,
        };

        let l1_handler = match grouped.l1_handlers.as_slice() {
            [entry] => Some(
                parse_function(entry, &types, name)
                    .map_err(|e| e.in_section(AbiSection::L1Handler))?,
            ),
            _ => None,
        };

        let mut implemented_interfaces = IndexMap::new();
        for entry in &grouped.impls {
            let raw: RawImpl =
                from_entry(entry).map_err(|e| e.in_section(AbiSection::ImplementedInterfaces))?;
            let Some(interface_name) = raw.interface_name else {
                continue;
            };
            match interfaces.iter().find(|iface| iface.name == interface_name) {
                Some(iface) => {
                    implemented_interfaces.insert(iface.name.clone(), iface.clone());
                }
                None => tracing::debug!(
                    "Impl {} references undeclared interface {}",
                    raw.name,
                    interface_name
                ),
            }
        }

        tracing::debug!(
            "Parsed ABI {}: {} functions, {} events",
            name,
            functions.len(),
            events.len()
        );

        Ok(Self {
            name: name.to_string(),
            class_hash,
            functions,
            events,
            constructor,
            l1_handler,
            implemented_interfaces,
        })
    }
}

fn parse_parameters(members: &[RawMember], types: &TypeMap) -> AbiResult<Vec<AbiParameter>> {
    members
        .iter()
        .map(|member| -> AbiResult<AbiParameter> {
            Ok(AbiParameter::new(&member.name, parse_type(&member.ty, types)?))
        })
        .collect()
}

fn parse_function(entry: &Value, types: &TypeMap, abi_name: &str) -> AbiResult<AbiFunction> {
    let raw: RawFunction = from_entry(entry)?;
    let inputs = parse_parameters(&raw.inputs, types)?;
    let outputs = raw
        .outputs
        .iter()
        .map(|output| parse_type(&output.ty, types))
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(AbiFunction::new(raw.name, inputs, outputs, abi_name))
}

fn parse_interface(entry: &Value, types: &TypeMap, abi_name: &str) -> AbiResult<AbiInterface> {
    let raw: RawInterface = from_entry(entry)?;
    let functions = raw
        .items
        .iter()
        .filter(|item| item.get("type").and_then(Value::as_str) == Some("function"))
        .map(|item| parse_function(item, types, abi_name))
        .collect::<AbiResult<Vec<_>>>()?;
    Ok(AbiInterface {
        name: raw.name,
        functions,
    })
}

/// Parse an event entry
///
/// Returns `None` for enum-kind events when they are configured to be
/// skipped. The event is named by the last segment of its path.
fn parse_event(
    entry: &Value,
    types: &TypeMap,
    abi_name: &str,
    config: &ParserConfig,
) -> AbiResult<Option<AbiEvent>> {
    let raw: RawEvent = from_entry(entry)?;
    let short_name = raw.name.rsplit("::").next().unwrap_or(&raw.name).to_string();

    let mut parameters = Vec::new();
    let mut keys = IndexMap::new();
    let mut data = IndexMap::new();
    let mut add = |member: &RawMember, is_key: bool| -> AbiResult<()> {
        let ty: StarknetType = parse_type(&member.ty, types)?;
        parameters.push(member.name.clone());
        if is_key {
            keys.insert(member.name.clone(), ty);
        } else {
            data.insert(member.name.clone(), ty);
        }
        Ok(())
    };

    match (raw.kind.as_deref(), &raw.members, &raw.inputs, &raw.data, &raw.keys) {
        (Some("enum"), ..) => {
            if config.skip_enum_events {
                tracing::debug!("Skipping enum event {}", raw.name);
                return Ok(None);
            }
            return Err(AbiError::InvalidAbi(format!(
                "enum events are not supported: {}",
                raw.name
            )));
        }
        (Some("struct"), Some(members), ..) => {
            for member in members {
                let is_key = match member.kind.as_deref() {
                    Some("key") => true,
                    Some("data" | "nested" | "flat") => false,
                    other => {
                        return Err(AbiError::InvalidAbi(format!(
                            "invalid kind {:?} for member {} of event {}",
                            other.unwrap_or_default(),
                            member.name,
                            raw.name
                        )))
                    }
                };
                add(member, is_key)?;
            }
        }
        (None, _, Some(inputs), ..) => {
            for member in inputs {
                add(member, false)?;
            }
        }
        (None, _, _, event_data, event_keys) if event_data.is_some() || event_keys.is_some() => {
            for member in event_data.iter().flatten() {
                add(member, false)?;
            }
            for member in event_keys.iter().flatten() {
                add(member, true)?;
            }
        }
        _ => {
            return Err(AbiError::InvalidAbi(format!(
                "unrecognized event encoding: {}",
                raw.name
            )))
        }
    }

    AbiEvent::new(short_name, parameters, data, keys, abi_name).map(Some)
}
