use std::rc::Rc;

use uuid::Uuid;

use super::{ObservablePointer, PropertyKind, Rotation, Vec2, Vec3, Vec4};
use crate::identity::{FileId, InstanceId, ObjectPointer};
use crate::observable::{Observable, PropertyChanged, Reactive};

/// A live, observable property value.
///
/// Cloning shares the underlying cell. Equality compares current values.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Float(Observable<f32>),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Rotation(Rotation),
    FileReference(Observable<FileId>),
    InstanceReference(Observable<InstanceId>),
    ObjectPointer(ObservablePointer),
    /// Membership is checked on decode and by `ComponentInstance::set_property`,
    /// not on writes through the cell itself.
    Enum(Observable<String>),
}

impl PropertyValue {
    pub fn float(value: f32) -> Self {
        PropertyValue::Float(Observable::new(value))
    }

    pub fn vec2(x: f32, y: f32) -> Self {
        PropertyValue::Vec2(Vec2::new([x, y]))
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        PropertyValue::Vec3(Vec3::new([x, y, z]))
    }

    pub fn vec4(x: f32, y: f32, z: f32, w: f32) -> Self {
        PropertyValue::Vec4(Vec4::new([x, y, z, w]))
    }

    pub fn rotation(quat: glam::Quat) -> Self {
        PropertyValue::Rotation(Rotation::new(quat))
    }

    pub fn file_reference(file_id: impl Into<FileId>) -> Self {
        PropertyValue::FileReference(Observable::new(file_id.into()))
    }

    pub fn instance_reference(instance_id: impl Into<InstanceId>) -> Self {
        PropertyValue::InstanceReference(Observable::new(instance_id.into()))
    }

    pub fn object_pointer(pointer: ObjectPointer) -> Self {
        PropertyValue::ObjectPointer(ObservablePointer::new(pointer))
    }

    pub fn enum_member(member: impl Into<String>) -> Self {
        PropertyValue::Enum(Observable::new(member.into()))
    }

    /// Name of the kind this value belongs to.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropertyValue::Float(_) => "Float",
            PropertyValue::Vec2(_) => "Vec2",
            PropertyValue::Vec3(_) => "Vec3",
            PropertyValue::Vec4(_) => "Vec4",
            PropertyValue::Rotation(_) => "Rotation",
            PropertyValue::FileReference(_) => "FileReference",
            PropertyValue::InstanceReference(_) => "InstanceReference",
            PropertyValue::ObjectPointer(_) => "ObjectPointer",
            PropertyValue::Enum(_) => "EnumReference",
        }
    }

    /// True when this value can be stored under a property of `kind`.
    pub fn matches(&self, kind: &PropertyKind) -> bool {
        self.kind_name() == kind.name()
    }

    /// A deep copy that shares no cells with `self`.
    pub fn detached(&self) -> Self {
        match self {
            PropertyValue::Float(cell) => PropertyValue::Float(cell.detached()),
            PropertyValue::Vec2(v) => PropertyValue::Vec2(v.detached()),
            PropertyValue::Vec3(v) => PropertyValue::Vec3(v.detached()),
            PropertyValue::Vec4(v) => PropertyValue::Vec4(v.detached()),
            PropertyValue::Rotation(r) => PropertyValue::Rotation(r.detached()),
            PropertyValue::FileReference(cell) => PropertyValue::FileReference(cell.detached()),
            PropertyValue::InstanceReference(cell) => {
                PropertyValue::InstanceReference(cell.detached())
            }
            PropertyValue::ObjectPointer(p) => PropertyValue::ObjectPointer(p.detached()),
            PropertyValue::Enum(cell) => PropertyValue::Enum(cell.detached()),
        }
    }

    pub fn as_float(&self) -> Option<&Observable<f32>> {
        match self {
            PropertyValue::Float(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_vec2(&self) -> Option<&Vec2> {
        match self {
            PropertyValue::Vec2(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec3(&self) -> Option<&Vec3> {
        match self {
            PropertyValue::Vec3(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vec4(&self) -> Option<&Vec4> {
        match self {
            PropertyValue::Vec4(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_rotation(&self) -> Option<&Rotation> {
        match self {
            PropertyValue::Rotation(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_file_reference(&self) -> Option<&Observable<FileId>> {
        match self {
            PropertyValue::FileReference(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_instance_reference(&self) -> Option<&Observable<InstanceId>> {
        match self {
            PropertyValue::InstanceReference(cell) => Some(cell),
            _ => None,
        }
    }

    pub fn as_object_pointer(&self) -> Option<&ObservablePointer> {
        match self {
            PropertyValue::ObjectPointer(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&Observable<String>> {
        match self {
            PropertyValue::Enum(cell) => Some(cell),
            _ => None,
        }
    }
}

impl Reactive for PropertyValue {
    fn observe(&self, handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid> {
        match self {
            PropertyValue::Float(cell) => cell.observe(handler),
            PropertyValue::Vec2(v) => v.observe(handler),
            PropertyValue::Vec3(v) => v.observe(handler),
            PropertyValue::Vec4(v) => v.observe(handler),
            PropertyValue::Rotation(r) => r.observe(handler),
            PropertyValue::FileReference(cell) => cell.observe(handler),
            PropertyValue::InstanceReference(cell) => cell.observe(handler),
            PropertyValue::ObjectPointer(p) => p.observe(handler),
            PropertyValue::Enum(cell) => cell.observe(handler),
        }
    }

    fn unobserve(&self, subscription: Uuid) {
        match self {
            PropertyValue::Float(cell) => cell.unobserve(subscription),
            PropertyValue::Vec2(v) => v.unobserve(subscription),
            PropertyValue::Vec3(v) => v.unobserve(subscription),
            PropertyValue::Vec4(v) => v.unobserve(subscription),
            PropertyValue::Rotation(r) => r.unobserve(subscription),
            PropertyValue::FileReference(cell) => cell.unobserve(subscription),
            PropertyValue::InstanceReference(cell) => cell.unobserve(subscription),
            PropertyValue::ObjectPointer(p) => p.unobserve(subscription),
            PropertyValue::Enum(cell) => cell.unobserve(subscription),
        }
    }
}
