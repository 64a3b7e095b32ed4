//! Engine schema loading and lookup
//!
//! The engine exports every component type as a map from property name to
//! native type signature. Loading classifies each signature into a
//! `PropertyKind`, resolves enum references, applies default values and
//! appends the implicit `fileId` / `instanceId` identities.

pub mod classify;
pub mod document;
pub mod error;
pub mod provider;
pub mod registry;

pub use classify::{classify, Classification, RULES_VERSION};
pub use document::{DefaultValues, DefaultsDocument, EngineType, SchemaDocument};
pub use error::SchemaError;
pub use provider::{FileSchemaProvider, SchemaProvider, SchemaSource, StaticSchemaProvider};
pub use registry::{ComponentSchema, SchemaRegistry, FILE_ID_KEY, INSTANCE_ID_KEY};
