//! Type dependency graph
//!
//! Struct and enum definitions may reference each other in any order.
//! The graph records, for every defined type, the custom types it refers
//! to, so definitions can be resolved dependencies first.

use std::collections::{HashMap, VecDeque};

use indexmap::{IndexMap, IndexSet};

use crate::entry::TypeDef;
use crate::error::{AbiError, AbiResult};
use crate::parser::{
    core_type_from_path, split_generic, split_top_level, strip_member_name, strip_snapshot,
    GenericWrapper,
};

/// Directed graph of type references
///
/// Insertion order is preserved, so sorting is deterministic for a given
/// document.
#[derive(Debug, Default, Clone)]
pub struct TypeGraph {
    /// Forward edges: type -> types that reference it
    forward: IndexMap<String, Vec<String>>,
    /// Backward edges: type -> types it references
    backward: IndexMap<String, IndexSet<String>>,
}

impl TypeGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type
    pub fn add_type(&mut self, name: &str) {
        self.forward.entry(name.to_string()).or_default();
        self.backward.entry(name.to_string()).or_default();
    }

    /// Record that `dependent` references `dependency`
    pub fn add_dependency(&mut self, dependent: &str, dependency: &str) {
        self.add_type(dependent);
        self.add_type(dependency);

        if self
            .backward
            .entry(dependent.to_string())
            .or_default()
            .insert(dependency.to_string())
        {
            self.forward
                .entry(dependency.to_string())
                .or_default()
                .push(dependent.to_string());
        }
    }

    /// Types that reference `name`
    pub fn dependents(&self, name: &str) -> &[String] {
        self.forward.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Types referenced by `name`
    pub fn dependencies(&self, name: &str) -> Vec<&str> {
        self.backward
            .get(name)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of types referenced by `name`
    pub fn in_degree(&self, name: &str) -> usize {
        self.backward.get(name).map(IndexSet::len).unwrap_or(0)
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.backward.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.backward.is_empty()
    }

    /// Order types so every type comes after all types it references
    ///
    /// Uses Kahn's algorithm. Fails if the references form a cycle.
    pub fn topological_sort(&self) -> AbiResult<Vec<String>> {
        let mut in_degree: HashMap<&str, usize> = self
            .backward
            .keys()
            .map(|name| (name.as_str(), self.in_degree(name)))
            .collect();

        let mut queue: VecDeque<&str> = self
            .backward
            .keys()
            .map(String::as_str)
            .filter(|name| in_degree.get(name).copied() == Some(0))
            .collect();

        let mut result = Vec::with_capacity(self.len());

        while let Some(name) = queue.pop_front() {
            result.push(name.to_string());

            for dependent in self.dependents(name) {
                if let Some(deg) = in_degree.get_mut(dependent.as_str()) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dependent.as_str());
                    }
                }
            }
        }

        if result.len() != self.len() {
            let in_cycle = self
                .backward
                .keys()
                .find(|name| in_degree.get(name.as_str()).copied().unwrap_or(0) > 0)
                .cloned()
                .unwrap_or_default();
            return Err(AbiError::InvalidAbi(format!(
                "circular type reference involving {}",
                in_cycle
            )));
        }

        Ok(result)
    }
}

/// Build the reference graph of a set of type definitions
///
/// References to core types, and to containers of core types, are not
/// edges. Types that are referenced but never defined still appear as
/// nodes.
pub fn build_type_graph(type_defs: &[TypeDef]) -> TypeGraph {
    let mut graph = TypeGraph::new();

    for def in type_defs {
        graph.add_type(def.name());
        let mut refs = IndexSet::new();
        for member in def.members() {
            collect_custom_refs(&member.ty, &mut refs);
        }
        for referenced in &refs {
            graph.add_dependency(def.name(), referenced);
        }
    }

    graph
}

/// Collect the custom type names a type string refers to
fn collect_custom_refs(type_str: &str, refs: &mut IndexSet<String>) {
    let s = strip_snapshot(type_str.trim());

    if s.is_empty() || s == "()" || s == "felt" || s == "Uint256" {
        return;
    }
    if let Some(inner) = s.strip_suffix('*') {
        collect_custom_refs(inner, refs);
        return;
    }
    if s.starts_with('(') {
        let inner = s
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .unwrap_or_default();
        for member in split_top_level(inner).unwrap_or_default() {
            collect_custom_refs(strip_member_name(member), refs);
        }
        return;
    }
    if core_type_from_path(s).is_some() {
        return;
    }
    if let Some((wrapper, inner)) = split_generic(s) {
        if wrapper != GenericWrapper::Other {
            collect_custom_refs(inner, refs);
            return;
        }
    }

    refs.insert(s.to_string());
}

/// Reorder type definitions so each follows the types it references
///
/// Fails if a referenced type is not defined, if a type is defined more
/// than once, or if the references are circular.
pub fn topo_sort_type_defs(type_defs: &[TypeDef]) -> AbiResult<Vec<TypeDef>> {
    let graph = build_type_graph(type_defs);
    let order = graph.topological_sort()?;

    let mut by_name: HashMap<&str, Vec<&TypeDef>> = HashMap::new();
    for def in type_defs {
        by_name.entry(def.name()).or_default().push(def);
    }

    order
        .iter()
        .map(|name| match by_name.get(name.as_str()).map(Vec::as_slice) {
            Some([def]) => Ok((*def).clone()),
            Some([]) | None => Err(AbiError::InvalidAbi(format!(
                "Type {} not defined in ABI",
                name
            ))),
            Some(_) => Err(AbiError::InvalidAbi(format!(
                "Type {} defined multiple times in ABI",
                name
            ))),
        })
        .collect()
}
