//! Component instances and their document codec
//!
//! A component document names its type and lists the properties it
//! overrides. Decoding validates every key and value against the schema
//! registry; nothing unknown is silently dropped.

pub mod codec;
pub mod collection;
pub mod error;
mod instance;

pub use codec::{
    decode, decode_str, encode, encode_to_string, instantiate, to_document, ComponentDocument,
};
pub use collection::{
    decode_component_nodes, decode_components, encode_components, DecodedComponents, ItemFailure,
};
pub use error::DecodeError;
pub use instance::{CommitScheduler, ComponentInstance, WeakComponentInstance};
