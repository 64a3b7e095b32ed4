use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use glam::{EulerRot, Quat};
use uuid::Uuid;

use crate::observable::{Notifier, PropertyChanged, Reactive};

/// An observable orientation backed by a quaternion.
///
/// Persisted as the four components `[x, y, z, w]`. Editors work with Euler
/// angles in degrees (pitch about X, yaw about Y, roll about Z).
pub struct Rotation {
    inner: Rc<RotationInner>,
}

struct RotationInner {
    quat: RefCell<Quat>,
    changed: Notifier<PropertyChanged>,
}

impl Rotation {
    pub fn new(quat: Quat) -> Self {
        Self {
            inner: Rc::new(RotationInner {
                quat: RefCell::new(quat),
                changed: Notifier::new(),
            }),
        }
    }

    pub fn identity() -> Self {
        Self::new(Quat::IDENTITY)
    }

    pub fn from_array(xyzw: [f32; 4]) -> Self {
        Self::new(Quat::from_array(xyzw))
    }

    pub fn to_array(&self) -> [f32; 4] {
        self.quat().to_array()
    }

    pub fn quat(&self) -> Quat {
        *self.inner.quat.borrow()
    }

    pub fn set_quat(&self, quat: Quat) -> bool {
        if *self.inner.quat.borrow() == quat {
            return false;
        }
        *self.inner.quat.borrow_mut() = quat;
        self.inner.changed.emit(PropertyChanged::new("quat"));
        true
    }

    /// Pitch, yaw and roll in degrees.
    pub fn euler_degrees(&self) -> glam::Vec3 {
        let (yaw, pitch, roll) = self.quat().to_euler(EulerRot::YXZ);
        glam::Vec3::new(pitch.to_degrees(), yaw.to_degrees(), roll.to_degrees())
    }

    pub fn set_euler_degrees(&self, degrees: glam::Vec3) -> bool {
        self.set_quat(Quat::from_euler(
            EulerRot::YXZ,
            degrees.y.to_radians(),
            degrees.x.to_radians(),
            degrees.z.to_radians(),
        ))
    }

    pub fn subscribe(&self, handler: impl Fn(&PropertyChanged) + 'static) -> Uuid {
        self.inner.changed.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.inner.changed.unsubscribe(id)
    }

    pub fn detached(&self) -> Self {
        Self::new(self.quat())
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Clone for Rotation {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl PartialEq for Rotation {
    fn eq(&self, other: &Self) -> bool {
        self.quat() == other.quat()
    }
}

impl fmt::Debug for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotation{:?}", self.to_array())
    }
}

impl Reactive for Rotation {
    fn observe(&self, handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid> {
        Some(self.inner.changed.subscribe_rc(handler))
    }

    fn unobserve(&self, subscription: Uuid) {
        self.unsubscribe(subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_identity_is_xyzw_0001() {
        assert_eq!(Rotation::identity().to_array(), [0.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_euler_round_trip() {
        let rotation = Rotation::identity();
        rotation.set_euler_degrees(glam::Vec3::new(30.0, 45.0, 10.0));
        let euler = rotation.euler_degrees();
        assert!((euler.x - 30.0).abs() < 1e-2);
        assert!((euler.y - 45.0).abs() < 1e-2);
        assert!((euler.z - 10.0).abs() < 1e-2);
    }

    #[test]
    fn test_set_same_quat_is_noop() {
        let rotation = Rotation::identity();
        let fired = Rc::new(Cell::new(0));
        let f = Rc::clone(&fired);
        rotation.subscribe(move |_| f.set(f.get() + 1));

        assert!(!rotation.set_quat(Quat::IDENTITY));
        assert!(rotation.set_quat(Quat::from_rotation_y(1.0)));
        assert_eq!(fired.get(), 1);
    }
}
