//! Rigging - schema-driven component data for engine editors
//!
//! The engine exports the legal shape of every component as a schema
//! document. Rigging classifies that schema into a closed set of property
//! kinds, decodes persisted component documents into reactive instances,
//! tracks edits, and pushes the re-encoded documents back to the engine.
//!
//! # Data flow
//!
//! ```text
//! SchemaProvider
//!   ↓ (load once at startup)
//! SchemaRegistry (immutable, Arc-shared)
//!   ↓ (decode component documents)
//! ComponentInstance (Observable cells, dirty flag)
//!   ↓ (edits schedule a commit)
//! CommitPipeline → EngineCommitSink
//! ```

pub mod commit;
pub mod component;
pub mod config;
pub mod identity;
pub mod observable;
pub mod property;
pub mod schema;

pub use commit::{
    CommitError, CommitOutcome, CommitPipeline, CommitReport, DirectoryCommitSink, EngineCommitSink,
    MemoryCommitSink,
};
pub use component::{
    decode_components, encode_components, ComponentDocument, ComponentInstance, DecodeError,
    DecodedComponents,
};
pub use config::{CommitPolicy, RiggingConfig};
pub use identity::{FileId, InstanceId, ObjectPointer, ReferenceKind};
pub use observable::{Observable, ObservableDictionary, ObservableList, Reactive};
pub use property::{PropertyKind, PropertyValue, Rotation, Vec2, Vec3, Vec4};
pub use schema::{ComponentSchema, SchemaError, SchemaProvider, SchemaRegistry};
