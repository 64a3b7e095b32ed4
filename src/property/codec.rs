//! Per-kind conversion between document nodes and property values
//!
//! Floats are written in their shortest round-tripping decimal form, so a
//! value read as `0.1` is written back as `0.1`. Decoding accepts numbers and
//! numeric strings.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use super::{EnumTable, ObservablePointer, PropertyKind, PropertyValue, Rotation, Vec2, Vec3, Vec4};
use crate::identity::{FileId, InstanceId, ObjectPointer};
use crate::observable::Observable;

const FILE_ID_FIELD: &str = "fileId";
const INSTANCE_ID_FIELD: &str = "instanceId";

/// A document node did not have the shape its property kind requires.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected}")]
pub struct ShapeError {
    pub expected: String,
}

impl ShapeError {
    fn for_kind(kind: &PropertyKind) -> Self {
        Self {
            expected: kind.expected_shape(),
        }
    }
}

/// Decode `node` as a value of `kind`.
///
/// `enums` supplies the member lists for enum references.
pub fn decode_value(
    kind: &PropertyKind,
    node: &Value,
    enums: &EnumTable,
) -> Result<PropertyValue, ShapeError> {
    let mismatch = || ShapeError::for_kind(kind);
    let value = match kind {
        PropertyKind::Float { .. } => {
            PropertyValue::Float(Observable::new(decode_float(node).ok_or_else(mismatch)?))
        }
        PropertyKind::Vec2 { .. } => {
            PropertyValue::Vec2(Vec2::new(decode_floats(node).ok_or_else(mismatch)?))
        }
        PropertyKind::Vec3 { .. } => {
            PropertyValue::Vec3(Vec3::new(decode_floats(node).ok_or_else(mismatch)?))
        }
        PropertyKind::Vec4 { .. } => {
            PropertyValue::Vec4(Vec4::new(decode_floats(node).ok_or_else(mismatch)?))
        }
        PropertyKind::Rotation { .. } => {
            PropertyValue::Rotation(Rotation::from_array(decode_floats(node).ok_or_else(mismatch)?))
        }
        PropertyKind::FileReference { .. } => {
            let text = node.as_str().ok_or_else(mismatch)?;
            PropertyValue::FileReference(Observable::new(FileId::new(text)))
        }
        PropertyKind::InstanceReference { .. } => {
            let text = node.as_str().ok_or_else(mismatch)?;
            PropertyValue::InstanceReference(Observable::new(InstanceId::new(text)))
        }
        PropertyKind::ObjectPointer { .. } => {
            PropertyValue::ObjectPointer(ObservablePointer::new(decode_pointer(node).ok_or_else(mismatch)?))
        }
        PropertyKind::EnumReference { enum_name, .. } => {
            let member = node.as_str().ok_or_else(mismatch)?;
            let known = enums
                .get(enum_name)
                .map(|members| members.iter().any(|m| m == member))
                .unwrap_or(false);
            if !known {
                return Err(mismatch());
            }
            PropertyValue::Enum(Observable::new(member.to_string()))
        }
    };
    Ok(value)
}

/// Encode the current state of `value` as a document node.
pub fn encode_value(value: &PropertyValue) -> Value {
    match value {
        PropertyValue::Float(cell) => encode_float(cell.get()),
        PropertyValue::Vec2(v) => encode_floats(&v.components()),
        PropertyValue::Vec3(v) => encode_floats(&v.components()),
        PropertyValue::Vec4(v) => encode_floats(&v.components()),
        PropertyValue::Rotation(r) => encode_floats(&r.to_array()),
        PropertyValue::FileReference(cell) => Value::String(cell.get().to_string()),
        PropertyValue::InstanceReference(cell) => Value::String(cell.get().to_string()),
        PropertyValue::ObjectPointer(pointer) => encode_pointer(&pointer.get()),
        PropertyValue::Enum(cell) => Value::String(cell.get()),
    }
}

pub fn decode_float(node: &Value) -> Option<f32> {
    let wide = match node {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    narrow_float(wide)
}

/// A finite value outside the `f32` range is refused, never turned into infinity.
fn narrow_float(wide: f64) -> Option<f32> {
    let narrow = wide as f32;
    if wide.is_finite() && !narrow.is_finite() {
        return None;
    }
    Some(narrow)
}

pub fn encode_float(value: f32) -> Value {
    // f32 Display yields the shortest decimal that reads back as the same f32
    let text = value.to_string();
    match text.parse::<f64>() {
        Ok(wide) => Value::Number(wide.into()),
        Err(_) => Value::String(text),
    }
}

fn decode_floats<const N: usize>(node: &Value) -> Option<[f32; N]> {
    let sequence = node.as_sequence()?;
    if sequence.len() != N {
        return None;
    }
    let mut components = [0.0f32; N];
    for (slot, item) in components.iter_mut().zip(sequence) {
        *slot = decode_float(item)?;
    }
    Some(components)
}

fn encode_floats(components: &[f32]) -> Value {
    Value::Sequence(components.iter().copied().map(encode_float).collect())
}

/// Null reads as the empty pointer and a missing half reads as its sentinel.
fn decode_pointer(node: &Value) -> Option<ObjectPointer> {
    let mapping = match node {
        Value::Null => return Some(ObjectPointer::empty()),
        Value::Mapping(mapping) => mapping,
        _ => return None,
    };

    let mut pointer = ObjectPointer::empty();
    for (key, value) in mapping {
        match key.as_str()? {
            FILE_ID_FIELD => pointer.file_id = FileId::new(value.as_str()?),
            INSTANCE_ID_FIELD => pointer.instance_id = InstanceId::new(value.as_str()?),
            _ => return None,
        }
    }
    Some(pointer)
}

fn encode_pointer(pointer: &ObjectPointer) -> Value {
    let mut mapping = Mapping::new();
    mapping.insert(
        Value::String(FILE_ID_FIELD.to_string()),
        Value::String(pointer.file_id.to_string()),
    );
    mapping.insert(
        Value::String(INSTANCE_ID_FIELD.to_string()),
        Value::String(pointer.instance_id.to_string()),
    );
    Value::Mapping(mapping)
}
