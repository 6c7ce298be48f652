//! Raw ABI JSON entries
//!
//! An ABI document is a JSON array of objects, each tagged by a `type`
//! field. Entries are grouped by that tag first and only deserialized into
//! the typed shapes below when their section is parsed, so a malformed
//! entry is reported against the section it belongs to.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{AbiError, AbiResult};

/// Kind of top-level ABI entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// `function`
    Function,
    /// `constructor`
    Constructor,
    /// `l1_handler`
    L1Handler,
    /// `event`
    Event,
    /// `struct`
    Struct,
    /// `enum`
    Enum,
    /// `interface`
    Interface,
    /// `impl`
    Impl,
}

impl MemberKind {
    /// Map the `type` tag of an entry
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "function" => Some(MemberKind::Function),
            "constructor" => Some(MemberKind::Constructor),
            "l1_handler" => Some(MemberKind::L1Handler),
            "event" => Some(MemberKind::Event),
            "struct" => Some(MemberKind::Struct),
            "enum" => Some(MemberKind::Enum),
            "interface" => Some(MemberKind::Interface),
            "impl" => Some(MemberKind::Impl),
            _ => None,
        }
    }
}

/// ABI entries grouped by kind, each group in document order
#[derive(Debug, Clone, Default)]
pub struct GroupedAbi {
    /// Top-level functions
    pub functions: Vec<Value>,
    /// Constructors
    pub constructors: Vec<Value>,
    /// L1 handlers
    pub l1_handlers: Vec<Value>,
    /// Events
    pub events: Vec<Value>,
    /// Struct and enum definitions
    pub type_defs: Vec<Value>,
    /// Interfaces
    pub interfaces: Vec<Value>,
    /// Impls
    pub impls: Vec<Value>,
}

/// Partition ABI entries by their `type` tag
///
/// Entries with an unrecognized tag are skipped.
pub fn group_by_member_kind(entries: &[Value]) -> AbiResult<GroupedAbi> {
    let mut grouped = GroupedAbi::default();

    for entry in entries {
        let tag = entry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| AbiError::InvalidAbi(format!("ABI entry missing type: {}", entry)))?;

        let Some(kind) = MemberKind::from_tag(tag) else {
            tracing::debug!("Skipping ABI entry of unknown type {}", tag);
            continue;
        };

        let group = match kind {
            MemberKind::Function => &mut grouped.functions,
            MemberKind::Constructor => &mut grouped.constructors,
            MemberKind::L1Handler => &mut grouped.l1_handlers,
            MemberKind::Event => &mut grouped.events,
            MemberKind::Struct | MemberKind::Enum => &mut grouped.type_defs,
            MemberKind::Interface => &mut grouped.interfaces,
            MemberKind::Impl => &mut grouped.impls,
        };
        group.push(entry.clone());
    }

    Ok(grouped)
}

/// Deserialize a raw entry into one of the typed shapes
pub(crate) fn from_entry<T: for<'de> Deserialize<'de>>(entry: &Value) -> AbiResult<T> {
    T::deserialize(entry).map_err(|e| AbiError::InvalidAbi(format!("{}: {}", e, entry)))
}

/// Named member of a struct, enum, function or event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMember {
    /// Member name
    pub name: String,
    /// Type string
    #[serde(rename = "type")]
    pub ty: String,
    /// Event member kind (`key`, `data`, `nested`, `flat`)
    #[serde(default)]
    pub kind: Option<String>,
}

/// Struct or enum definition
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TypeDef {
    /// Struct definition
    Struct {
        /// Fully qualified name
        name: String,
        /// Members in declaration order
        members: Vec<RawMember>,
    },
    /// Enum definition
    Enum {
        /// Fully qualified name
        name: String,
        /// Variants in declaration order
        variants: Vec<RawMember>,
    },
}

impl TypeDef {
    /// Fully qualified name
    pub fn name(&self) -> &str {
        match self {
            TypeDef::Struct { name, .. } | TypeDef::Enum { name, .. } => name,
        }
    }

    /// Struct members or enum variants
    pub fn members(&self) -> &[RawMember] {
        match self {
            TypeDef::Struct { members, .. } => members,
            TypeDef::Enum { variants, .. } => variants,
        }
    }
}

/// Function, constructor or L1 handler entry
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawFunction {
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<RawMember>,
    #[serde(default)]
    pub outputs: Vec<RawOutput>,
}

/// Function output; Cairo 0 outputs carry a name, Cairo 1 outputs do not
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawOutput {
    #[serde(rename = "type")]
    pub ty: String,
}

/// Event entry in any of its encodings
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawEvent {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub members: Option<Vec<RawMember>>,
    #[serde(default)]
    pub inputs: Option<Vec<RawMember>>,
    #[serde(default)]
    pub data: Option<Vec<RawMember>>,
    #[serde(default)]
    pub keys: Option<Vec<RawMember>>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawInterface {
    pub name: String,
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawImpl {
    pub name: String,
    #[serde(default)]
    pub interface_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_group_by_member_kind() {
        let abi = vec![
            json!({"type": "function", "name": "transfer", "inputs": [], "outputs": []}),
            json!({"type": "struct", "name": "demo::Point", "members": []}),
            json!({"type": "enum", "name": "demo::Status", "variants": []}),
            json!({"type": "event", "name": "Transfer", "kind": "struct", "members": []}),
            json!({"type": "impl", "name": "Impl", "interface_name": "demo::IFace"}),
            json!({"type": "something_new", "name": "x"}),
        ];
        let grouped = group_by_member_kind(&abi).unwrap();
        assert_eq!(grouped.functions.len(), 1);
        assert_eq!(grouped.type_defs.len(), 2);
        assert_eq!(grouped.events.len(), 1);
        assert_eq!(grouped.impls.len(), 1);
        assert!(grouped.constructors.is_empty());
    }

    #[test]
    fn test_group_requires_type_tag() {
        let abi = vec![json!({"name": "orphan"})];
        assert!(matches!(
            group_by_member_kind(&abi),
            Err(AbiError::InvalidAbi(_))
        ));
    }

    #[test]
    fn test_type_def_deserialize() {
        let def: TypeDef = from_entry(&json!({
            "type": "enum",
            "name": "demo::Status",
            "variants": [
                {"name": "Ready", "type": "()"},
                {"name": "Failed", "type": "core::felt252"}
            ]
        }))
        .unwrap();
        assert_eq!(def.name(), "demo::Status");
        assert_eq!(def.members().len(), 2);
        assert_eq!(def.members()[1].ty, "core::felt252");
    }
}
