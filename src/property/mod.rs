//! Property kinds and their live values
//!
//! `PropertyKind` is what a schema says a property is. `PropertyValue` is the
//! observable value an instance holds for it. `codec` converts between values
//! and document nodes.

pub mod codec;
mod kind;
mod pointer;
mod rotation;
mod value;
mod vector;

pub use codec::{decode_value, encode_value, ShapeError};
pub use kind::PropertyKind;
pub use pointer::ObservablePointer;
pub use rotation::Rotation;
pub use value::PropertyValue;
pub use vector::{ObservableVector, Vec2, Vec3, Vec4};

use indexmap::IndexMap;

/// Enum name to its ordered member names.
pub type EnumTable = IndexMap<String, Vec<String>>;
