//! Decoder registry

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;
use starkabi_abi::{
    decode_event_fields, decode_function_io, event_id_str, function_id_str, AbiDocument,
    AbiEvent, AbiFunction, AbiParameter, BigUint, DecodedEvent, DecodedFunction, StarknetType,
};
use starkabi_crypto::short_hash;
use starkabi_primitives::{Hash32, ShortKey};

use crate::error::{DispatchError, DispatchResult};

/// Interned function signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionType {
    /// Named inputs
    pub inputs: Vec<AbiParameter>,
    /// Output types
    pub outputs: Vec<StarknetType>,
}

/// Interned event signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventType {
    /// Parameter names in declaration order
    pub parameters: Vec<String>,
    /// Parameters carried in the keys
    pub keys: IndexMap<String, StarknetType>,
    /// Parameters carried in the data
    pub data: IndexMap<String, StarknetType>,
}

/// Selector entry of a class: which interned type to decode with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchEntry {
    /// Key into the shared type table
    pub type_key: ShortKey,
    /// Member name
    pub name: String,
}

/// Snapshot of a registered class
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassInfo {
    /// ABI name
    pub abi_name: String,
    /// Class hash
    pub class_hash: Hash32,
    /// Function names, sorted
    pub functions: Vec<String>,
    /// Event names, sorted
    pub events: Vec<String>,
}

#[derive(Debug, Clone)]
struct ClassDispatcher {
    abi_name: String,
    class_hash: Hash32,
    functions: HashMap<ShortKey, DispatchEntry>,
    events: HashMap<ShortKey, DispatchEntry>,
}

#[derive(Debug, Default)]
struct Registry {
    classes: HashMap<ShortKey, ClassDispatcher>,
    function_types: HashMap<ShortKey, Arc<FunctionType>>,
    event_types: HashMap<ShortKey, Arc<EventType>>,
}

/// Registry of parsed ABIs
///
/// Classes are keyed by the low 8 bytes of their class hash and members by
/// the low 8 bytes of their selector. Function and event shapes are shared
/// across classes: a shape is keyed by its name together with its canonical
/// type id, so equal signatures are stored once and different signatures
/// with the same name never collide.
///
/// Registration takes the write lock; decoding only holds the read lock
/// while looking up the decoder, so concurrent decodes never block each
/// other.
#[derive(Debug, Default)]
pub struct Dispatcher {
    registry: RwLock<Registry>,
}

impl Dispatcher {
    /// Create an empty dispatcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if no classes are registered
    pub fn is_empty(&self) -> bool {
        self.registry.read().classes.is_empty()
    }

    /// Number of registered classes
    pub fn class_count(&self) -> usize {
        self.registry.read().classes.len()
    }

    /// Number of distinct interned function and event shapes
    pub fn interned_type_count(&self) -> (usize, usize) {
        let registry = self.registry.read();
        (registry.function_types.len(), registry.event_types.len())
    }

    /// Register a parsed ABI under its class hash
    ///
    /// Registering the same class hash again replaces the previous entry.
    pub fn add_abi(&self, abi: &AbiDocument) {
        let mut functions = HashMap::with_capacity(abi.functions.len());
        let mut function_types = Vec::with_capacity(abi.functions.len());
        for function in abi.functions.values() {
            let (entry, ty) = intern_function(function);
            function_types.push((entry.type_key, ty));
            functions.insert(function.selector.short_key(), entry);
        }

        let mut events = HashMap::with_capacity(abi.events.len());
        let mut event_types = Vec::with_capacity(abi.events.len());
        for event in abi.events.values() {
            let (entry, ty) = intern_event(event);
            event_types.push((entry.type_key, ty));
            events.insert(event.selector.short_key(), entry);
        }

        let class = ClassDispatcher {
            abi_name: abi.name.clone(),
            class_hash: abi.class_hash,
            functions,
            events,
        };

        let mut registry = self.registry.write();
        for (key, ty) in function_types {
            registry.function_types.entry(key).or_insert_with(|| Arc::new(ty));
        }
        for (key, ty) in event_types {
            registry.event_types.entry(key).or_insert_with(|| Arc::new(ty));
        }
        if let Some(previous) = registry.classes.insert(abi.class_hash.short_key(), class) {
            tracing::warn!(
                "Replaced ABI {} for class {} with {}",
                previous.abi_name,
                abi.class_hash,
                abi.name
            );
        }

        tracing::info!(
            "Registered ABI {} for class {} ({} functions, {} events)",
            abi.name,
            abi.class_hash,
            abi.functions.len(),
            abi.events.len()
        );
    }

    /// Snapshot of a registered class
    pub fn get_class(&self, class_hash: Hash32) -> Option<ClassInfo> {
        let registry = self.registry.read();
        let class = registry.classes.get(&class_hash.short_key())?;

        let mut functions: Vec<_> = class.functions.values().map(|e| e.name.clone()).collect();
        let mut events: Vec<_> = class.events.values().map(|e| e.name.clone()).collect();
        functions.sort();
        events.sort();

        Some(ClassInfo {
            abi_name: class.abi_name.clone(),
            class_hash: class.class_hash,
            functions,
            events,
        })
    }

    /// Decode a function call of a registered class
    ///
    /// `calldata` must be consumed exactly. Outputs are decoded only when a
    /// `result` is given, and it must be consumed exactly too.
    pub fn decode_function(
        &self,
        calldata: &[BigUint],
        result: Option<&[BigUint]>,
        function_selector: Hash32,
        class_hash: Hash32,
    ) -> DispatchResult<DecodedFunction> {
        let (abi_name, name, ty) = {
            let registry = self.registry.read();
            let class = registry
                .classes
                .get(&class_hash.short_key())
                .ok_or(DispatchError::ClassNotFound(class_hash))?;
            let entry = class
                .functions
                .get(&function_selector.short_key())
                .ok_or(DispatchError::FunctionNotFound {
                    class_hash,
                    selector: function_selector,
                })?;
            let ty = registry
                .function_types
                .get(&entry.type_key)
                .cloned()
                .ok_or_else(|| {
                    DispatchError::Decode(format!("no decoder for function {}", entry.name))
                })?;
            (class.abi_name.clone(), entry.name.clone(), ty)
        };

        tracing::debug!("Decoding function {} of {}", name, abi_name);
        let (inputs, outputs) = decode_function_io(&ty.inputs, &ty.outputs, calldata, result)?;

        Ok(DecodedFunction {
            abi_name,
            name,
            inputs,
            outputs,
        })
    }

    /// Decode an event emitted by a registered class
    ///
    /// `keys[0]` is the event selector. Both buffers must be consumed
    /// exactly.
    pub fn decode_event(
        &self,
        data: &[BigUint],
        keys: &[BigUint],
        class_hash: Hash32,
    ) -> DispatchResult<DecodedEvent> {
        let selector_key = keys
            .first()
            .ok_or_else(|| DispatchError::Decode("event has no keys".to_string()))?;
        let event_selector = Hash32::from_biguint(selector_key)
            .map_err(|e| DispatchError::Decode(format!("invalid event selector: {}", e)))?;

        let (abi_name, name, ty) = {
            let registry = self.registry.read();
            let class = registry
                .classes
                .get(&class_hash.short_key())
                .ok_or(DispatchError::ClassNotFound(class_hash))?;
            let entry = class
                .events
                .get(&event_selector.short_key())
                .ok_or(DispatchError::EventNotFound {
                    class_hash,
                    selector: event_selector,
                })?;
            let ty = registry
                .event_types
                .get(&entry.type_key)
                .cloned()
                .ok_or_else(|| {
                    DispatchError::Decode(format!("no decoder for event {}", entry.name))
                })?;
            (class.abi_name.clone(), entry.name.clone(), ty)
        };

        tracing::debug!("Decoding event {} of {}", name, abi_name);
        let decoded = decode_event_fields(&ty.parameters, &ty.keys, &ty.data, data, keys)?;

        Ok(DecodedEvent {
            abi_name,
            name,
            data: decoded,
        })
    }
}

fn intern_function(function: &AbiFunction) -> (DispatchEntry, FunctionType) {
    let id = function_id_str(&function.inputs, &function.outputs);
    let entry = DispatchEntry {
        type_key: short_hash(&format!("{}:{}", function.name, id)),
        name: function.name.clone(),
    };
    let ty = FunctionType {
        inputs: function.inputs.clone(),
        outputs: function.outputs.clone(),
    };
    (entry, ty)
}

fn intern_event(event: &AbiEvent) -> (DispatchEntry, EventType) {
    let id = event_id_str(&event.parameters, &event.keys, &event.data);
    let entry = DispatchEntry {
        type_key: short_hash(&format!("{}:{}", event.name, id)),
        name: event.name.clone(),
    };
    let ty = EventType {
        parameters: event.parameters.clone(),
        keys: event.keys.clone(),
        data: event.data.clone(),
    };
    (entry, ty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use starkabi_abi::CoreType;

    fn document(name: &str, class_byte: u8, amount_type: CoreType) -> AbiDocument {
        let transfer = AbiFunction::new(
            "transfer",
            vec![AbiParameter::new("amount", StarknetType::core(amount_type))],
            vec![],
            name,
        );
        let mut functions = IndexMap::new();
        functions.insert(transfer.name.clone(), transfer);

        AbiDocument {
            name: name.to_string(),
            class_hash: Hash32::from_bytes([class_byte; 32]),
            functions,
            events: IndexMap::new(),
            constructor: None,
            l1_handler: None,
            implemented_interfaces: IndexMap::new(),
        }
    }

    // ==================== Registration ====================

    #[test]
    fn test_empty_dispatcher() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.is_empty());
        assert!(dispatcher.get_class(Hash32::ZERO).is_none());
    }

    #[test]
    fn test_identical_shapes_interned_once() {
        let dispatcher = Dispatcher::new();
        dispatcher.add_abi(&document("a", 1, CoreType::U8));
        dispatcher.add_abi(&document("b", 2, CoreType::U8));
        dispatcher.add_abi(&document("c", 3, CoreType::U256));

        assert_eq!(dispatcher.class_count(), 3);
        assert_eq!(dispatcher.interned_type_count(), (2, 0));
    }

    #[test]
    fn test_reregistration_replaces_class() {
        let dispatcher = Dispatcher::new();
        dispatcher.add_abi(&document("old", 1, CoreType::U8));
        dispatcher.add_abi(&document("new", 1, CoreType::U8));

        assert_eq!(dispatcher.class_count(), 1);
        let info = dispatcher.get_class(Hash32::from_bytes([1; 32])).unwrap();
        assert_eq!(info.abi_name, "new");
        assert_eq!(info.functions, vec!["transfer"]);
    }

    // ==================== Lookup failures ====================

    #[test]
    fn test_class_not_found() {
        let dispatcher = Dispatcher::new();
        let err = dispatcher
            .decode_function(&[], None, starkabi_crypto::selector("transfer"), Hash32::ZERO)
            .unwrap_err();
        assert!(matches!(err, DispatchError::ClassNotFound(_)));
    }

    #[test]
    fn test_function_not_found() {
        let dispatcher = Dispatcher::new();
        let doc = document("a", 1, CoreType::U8);
        dispatcher.add_abi(&doc);

        let err = dispatcher
            .decode_function(&[], None, starkabi_crypto::selector("approve"), doc.class_hash)
            .unwrap_err();
        assert!(matches!(err, DispatchError::FunctionNotFound { .. }));
    }

    #[test]
    fn test_event_without_keys() {
        let dispatcher = Dispatcher::new();
        let doc = document("a", 1, CoreType::U8);
        dispatcher.add_abi(&doc);

        let err = dispatcher.decode_event(&[], &[], doc.class_hash).unwrap_err();
        assert!(matches!(err, DispatchError::Decode(_)));
    }
}
