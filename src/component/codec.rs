//! Component documents: `{typename, overrideProperties}`
//!
//! Decoding is split in two. `ComponentDocument::parse` only reads YAML and
//! produces a plain, `Send` document, so it can run on any thread.
//! `instantiate` builds the observable instance and must run on the thread
//! that owns the reactive graph.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use super::{ComponentInstance, DecodeError};
use crate::property::{decode_value, encode_value};
use crate::schema::SchemaRegistry;

pub const TYPENAME_FIELD: &str = "typename";
pub const OVERRIDES_FIELD: &str = "overrideProperties";

/// A parsed but not yet validated component document.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDocument {
    pub typename: String,
    pub override_properties: Mapping,
}

impl ComponentDocument {
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let node: Value = serde_yaml::from_str(text)?;
        Self::from_value(&node)
    }

    /// Read the two required keys. Any other top-level key is ignored.
    pub fn from_value(node: &Value) -> Result<Self, DecodeError> {
        let mapping = node
            .as_mapping()
            .ok_or_else(|| DecodeError::Syntax("component document is not a mapping".to_string()))?;

        let typename = mapping
            .get(TYPENAME_FIELD)
            .ok_or_else(|| DecodeError::MissingField(TYPENAME_FIELD.to_string()))?
            .as_str()
            .ok_or_else(|| DecodeError::ShapeMismatch {
                key: TYPENAME_FIELD.to_string(),
                expected: "a string".to_string(),
            })?
            .to_string();

        let override_properties = mapping
            .get(OVERRIDES_FIELD)
            .ok_or_else(|| DecodeError::MissingField(OVERRIDES_FIELD.to_string()))?
            .as_mapping()
            .cloned()
            .ok_or_else(|| DecodeError::ShapeMismatch {
                key: OVERRIDES_FIELD.to_string(),
                expected: "a mapping".to_string(),
            })?;

        Ok(Self {
            typename,
            override_properties,
        })
    }

    pub fn to_value(&self) -> Value {
        let mut mapping = Mapping::new();
        mapping.insert(
            Value::String(TYPENAME_FIELD.to_string()),
            Value::String(self.typename.clone()),
        );
        mapping.insert(
            Value::String(OVERRIDES_FIELD.to_string()),
            Value::Mapping(self.override_properties.clone()),
        );
        Value::Mapping(mapping)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(&self.to_value())
    }
}

/// Validate `document` against the registry and build the live instance.
///
/// The first offending key aborts the whole component.
pub fn instantiate(
    document: &ComponentDocument,
    registry: &SchemaRegistry,
) -> Result<ComponentInstance, DecodeError> {
    let schema = registry.lookup_component(&document.typename)?;

    let mut values = IndexMap::with_capacity(document.override_properties.len());
    for (key_node, node) in &document.override_properties {
        let key = key_node
            .as_str()
            .ok_or_else(|| DecodeError::UnknownProperty(render_key(key_node)))?;
        let kind = schema
            .property(key)
            .ok_or_else(|| DecodeError::UnknownProperty(key.to_string()))?;
        let value =
            decode_value(kind, node, registry.enums()).map_err(|err| DecodeError::ShapeMismatch {
                key: key.to_string(),
                expected: err.expected,
            })?;
        values.insert(key.to_string(), value);
    }

    Ok(ComponentInstance::from_values(Arc::clone(schema), values))
}

pub fn decode(node: &Value, registry: &SchemaRegistry) -> Result<ComponentInstance, DecodeError> {
    instantiate(&ComponentDocument::from_value(node)?, registry)
}

pub fn decode_str(text: &str, registry: &SchemaRegistry) -> Result<ComponentInstance, DecodeError> {
    instantiate(&ComponentDocument::parse(text)?, registry)
}

/// Snapshot the instance's current overrides as a document.
pub fn to_document(instance: &ComponentInstance) -> ComponentDocument {
    let override_properties = instance
        .entries()
        .iter()
        .map(|(key, value)| (Value::String(key.clone()), encode_value(value)))
        .collect();
    ComponentDocument {
        typename: instance.typename().to_string(),
        override_properties,
    }
}

pub fn encode(instance: &ComponentInstance) -> Value {
    to_document(instance).to_value()
}

pub fn encode_to_string(instance: &ComponentInstance) -> Result<String, serde_yaml::Error> {
    to_document(instance).to_yaml()
}

fn render_key(node: &Value) -> String {
    serde_yaml::to_string(node)
        .map(|text| text.trim().to_string())
        .unwrap_or_else(|_| format!("{:?}", node))
}
