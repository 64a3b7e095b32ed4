//! Serde model of the engine's exported schema document
//!
//! ```yaml
//! engineTypes:
//!   - typename: Sailor::LightComponent
//!     properties:
//!       intensity: float
//!       lightType: enum Sailor::ELightType
//!     instantiable: []
//! defaults:
//!   - typename: Sailor::LightComponent
//!     defaultValues:
//!       intensity: 1.0
//! enums:
//!   - Sailor::ELightType: [Directional, Point, Spot]
//! ```
//!
//! Unknown top-level keys are ignored.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use super::SchemaError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDocument {
    pub engine_types: Vec<EngineType>,
    #[serde(default)]
    pub defaults: Vec<DefaultValues>,
    #[serde(default)]
    pub enums: Vec<IndexMap<String, Vec<String>>>,
}

/// One component as exported by the engine: property name to native type signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineType {
    pub typename: String,
    pub properties: IndexMap<String, String>,
    /// Object pointer properties that may reference live instances.
    #[serde(default)]
    pub instantiable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultValues {
    pub typename: String,
    #[serde(default)]
    pub default_values: IndexMap<String, Value>,
}

/// A standalone defaults document: `defaults: [...]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultsDocument {
    #[serde(default)]
    pub defaults: Vec<DefaultValues>,
}

impl SchemaDocument {
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(text)?)
    }
}

impl DefaultsDocument {
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_yaml::from_str(text)?)
    }
}
