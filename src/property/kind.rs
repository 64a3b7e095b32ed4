use std::fmt;

use glam::Quat;

use super::{ObservablePointer, PropertyValue, Rotation, Vec2, Vec3, Vec4};
use crate::identity::{FileId, InstanceId};
use crate::observable::Observable;

/// The closed set of property kinds a schema can declare.
///
/// Each kind carries the default used when an instance overrides the
/// property without a value of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    Float { default: f32 },
    Vec2 { default: glam::Vec2 },
    Vec3 { default: glam::Vec3 },
    Vec4 { default: glam::Vec4 },
    Rotation { default: Quat },
    FileReference { default: FileId },
    InstanceReference { default: InstanceId },
    ObjectPointer { target: String, instantiable: bool },
    EnumReference { enum_name: String, default: String },
}

impl PropertyKind {
    pub fn float() -> Self {
        PropertyKind::Float { default: 0.0 }
    }

    pub fn vec2() -> Self {
        PropertyKind::Vec2 {
            default: glam::Vec2::ZERO,
        }
    }

    pub fn vec3() -> Self {
        PropertyKind::Vec3 {
            default: glam::Vec3::ZERO,
        }
    }

    pub fn vec4() -> Self {
        PropertyKind::Vec4 {
            default: glam::Vec4::ZERO,
        }
    }

    pub fn rotation() -> Self {
        PropertyKind::Rotation {
            default: Quat::IDENTITY,
        }
    }

    pub fn file_reference() -> Self {
        PropertyKind::FileReference {
            default: FileId::null(),
        }
    }

    pub fn instance_reference() -> Self {
        PropertyKind::InstanceReference {
            default: InstanceId::null(),
        }
    }

    pub fn object_pointer(target: impl Into<String>) -> Self {
        PropertyKind::ObjectPointer {
            target: target.into(),
            instantiable: false,
        }
    }

    pub fn enum_reference(enum_name: impl Into<String>, default: impl Into<String>) -> Self {
        PropertyKind::EnumReference {
            enum_name: enum_name.into(),
            default: default.into(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::Float { .. } => "Float",
            PropertyKind::Vec2 { .. } => "Vec2",
            PropertyKind::Vec3 { .. } => "Vec3",
            PropertyKind::Vec4 { .. } => "Vec4",
            PropertyKind::Rotation { .. } => "Rotation",
            PropertyKind::FileReference { .. } => "FileReference",
            PropertyKind::InstanceReference { .. } => "InstanceReference",
            PropertyKind::ObjectPointer { .. } => "ObjectPointer",
            PropertyKind::EnumReference { .. } => "EnumReference",
        }
    }

    /// Human-readable description of the document node this kind accepts.
    pub fn expected_shape(&self) -> String {
        match self {
            PropertyKind::Float { .. } => "a float".to_string(),
            PropertyKind::Vec2 { .. } => "a sequence of 2 floats".to_string(),
            PropertyKind::Vec3 { .. } => "a sequence of 3 floats".to_string(),
            PropertyKind::Vec4 { .. } => "a sequence of 4 floats".to_string(),
            PropertyKind::Rotation { .. } => "a quaternion as 4 floats [x, y, z, w]".to_string(),
            PropertyKind::FileReference { .. } => "a file id string".to_string(),
            PropertyKind::InstanceReference { .. } => "an instance id string".to_string(),
            PropertyKind::ObjectPointer { .. } => {
                "a mapping with fileId and instanceId strings".to_string()
            }
            PropertyKind::EnumReference { enum_name, .. } => {
                format!("a member of enum {}", enum_name)
            }
        }
    }

    /// Only object pointers can be instantiable.
    pub fn is_instantiable(&self) -> bool {
        matches!(
            self,
            PropertyKind::ObjectPointer {
                instantiable: true,
                ..
            }
        )
    }

    /// A fresh value cell holding this kind's default.
    pub fn default_value(&self) -> PropertyValue {
        match self {
            PropertyKind::Float { default } => PropertyValue::Float(Observable::new(*default)),
            PropertyKind::Vec2 { default } => PropertyValue::Vec2(Vec2::from_glam(*default)),
            PropertyKind::Vec3 { default } => PropertyValue::Vec3(Vec3::from_glam(*default)),
            PropertyKind::Vec4 { default } => PropertyValue::Vec4(Vec4::from_glam(*default)),
            PropertyKind::Rotation { default } => PropertyValue::Rotation(Rotation::new(*default)),
            PropertyKind::FileReference { default } => {
                PropertyValue::FileReference(Observable::new(default.clone()))
            }
            PropertyKind::InstanceReference { default } => {
                PropertyValue::InstanceReference(Observable::new(default.clone()))
            }
            PropertyKind::ObjectPointer { .. } => {
                PropertyValue::ObjectPointer(ObservablePointer::empty())
            }
            PropertyKind::EnumReference { default, .. } => {
                PropertyValue::Enum(Observable::new(default.clone()))
            }
        }
    }

    /// This kind with its default replaced by `value`.
    ///
    /// Returns `None` when the value belongs to another kind, and for object
    /// pointers, which have no scalar default.
    pub fn with_default(&self, value: &PropertyValue) -> Option<PropertyKind> {
        let kind = match (self, value) {
            (PropertyKind::Float { .. }, PropertyValue::Float(cell)) => {
                PropertyKind::Float {
                    default: cell.get(),
                }
            }
            (PropertyKind::Vec2 { .. }, PropertyValue::Vec2(v)) => PropertyKind::Vec2 {
                default: v.to_glam(),
            },
            (PropertyKind::Vec3 { .. }, PropertyValue::Vec3(v)) => PropertyKind::Vec3 {
                default: v.to_glam(),
            },
            (PropertyKind::Vec4 { .. }, PropertyValue::Vec4(v)) => PropertyKind::Vec4 {
                default: v.to_glam(),
            },
            (PropertyKind::Rotation { .. }, PropertyValue::Rotation(r)) => {
                PropertyKind::Rotation { default: r.quat() }
            }
            (PropertyKind::FileReference { .. }, PropertyValue::FileReference(cell)) => {
                PropertyKind::FileReference {
                    default: cell.get(),
                }
            }
            (PropertyKind::InstanceReference { .. }, PropertyValue::InstanceReference(cell)) => {
                PropertyKind::InstanceReference {
                    default: cell.get(),
                }
            }
            (PropertyKind::EnumReference { enum_name, .. }, PropertyValue::Enum(cell)) => {
                PropertyKind::EnumReference {
                    enum_name: enum_name.clone(),
                    default: cell.get(),
                }
            }
            _ => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::ObjectPointer {
                target,
                instantiable: true,
            } => write!(f, "ObjectPointer<{}> (instantiable)", target),
            PropertyKind::ObjectPointer { target, .. } => write!(f, "ObjectPointer<{}>", target),
            PropertyKind::EnumReference { enum_name, .. } => {
                write!(f, "EnumReference<{}>", enum_name)
            }
            other => f.write_str(other.name()),
        }
    }
}
