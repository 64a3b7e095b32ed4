//! Sequences of component documents, as stored for one game object

use serde_yaml::Value;

use super::codec::{self, TYPENAME_FIELD};
use super::{ComponentInstance, DecodeError};
use crate::observable::ObservableList;
use crate::schema::SchemaRegistry;

/// A component in a sequence that could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemFailure {
    pub index: usize,
    pub typename: Option<String>,
    pub error: DecodeError,
}

/// Result of decoding a sequence: the components that loaded, plus the ones
/// that did not.
#[derive(Debug, Clone)]
pub struct DecodedComponents {
    pub components: ObservableList<ComponentInstance>,
    /// Input position of each loaded component, parallel to `components` as decoded.
    pub source_indices: Vec<usize>,
    pub failures: Vec<ItemFailure>,
}

impl DecodedComponents {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Position in the input sequence of the component at `position`.
    pub fn source_index(&self, position: usize) -> Option<usize> {
        self.source_indices.get(position).copied()
    }
}

/// Decode a YAML sequence of component documents.
///
/// A failing item is reported and skipped; it never aborts its siblings.
pub fn decode_components(
    text: &str,
    registry: &SchemaRegistry,
) -> Result<DecodedComponents, DecodeError> {
    let root: Value = serde_yaml::from_str(text)?;
    match &root {
        Value::Sequence(items) => Ok(decode_component_nodes(items, registry)),
        Value::Null => Ok(decode_component_nodes(&[], registry)),
        _ => Err(DecodeError::Syntax(
            "component list is not a sequence".to_string(),
        )),
    }
}

pub fn decode_component_nodes(items: &[Value], registry: &SchemaRegistry) -> DecodedComponents {
    let mut components = Vec::with_capacity(items.len());
    let mut source_indices = Vec::with_capacity(items.len());
    let mut failures = Vec::new();

    for (index, node) in items.iter().enumerate() {
        match codec::decode(node, registry) {
            Ok(instance) => {
                components.push(instance);
                source_indices.push(index);
            }
            Err(error) => {
                let typename = node
                    .get(TYPENAME_FIELD)
                    .and_then(Value::as_str)
                    .map(str::to_string);
                log::warn!(
                    "Skipping component #{} ({}): {}",
                    index,
                    typename.as_deref().unwrap_or("unknown type"),
                    error
                );
                failures.push(ItemFailure {
                    index,
                    typename,
                    error,
                });
            }
        }
    }

    DecodedComponents {
        components: ObservableList::from_items(components),
        source_indices,
        failures,
    }
}

pub fn encode_components(components: &ObservableList<ComponentInstance>) -> Value {
    Value::Sequence(components.to_vec().iter().map(codec::encode).collect())
}
