use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::observable::{Notifier, PropertyChanged, Reactive};

const AXES: [&str; 4] = ["x", "y", "z", "w"];

/// A fixed-size float vector whose components are individually observable.
///
/// Writing a component emits a `PropertyChanged` naming its axis.
pub struct ObservableVector<const N: usize> {
    inner: Rc<VectorInner<N>>,
}

struct VectorInner<const N: usize> {
    components: RefCell<[f32; N]>,
    changed: Notifier<PropertyChanged>,
}

pub type Vec2 = ObservableVector<2>;
pub type Vec3 = ObservableVector<3>;
pub type Vec4 = ObservableVector<4>;

impl<const N: usize> ObservableVector<N> {
    pub fn new(components: [f32; N]) -> Self {
        Self {
            inner: Rc::new(VectorInner {
                components: RefCell::new(components),
                changed: Notifier::new(),
            }),
        }
    }

    pub fn zero() -> Self {
        Self::new([0.0; N])
    }

    pub fn components(&self) -> [f32; N] {
        *self.inner.components.borrow()
    }

    pub fn component(&self, axis: usize) -> Option<f32> {
        self.inner.components.borrow().get(axis).copied()
    }

    /// Returns true when the component existed and changed.
    pub fn set_component(&self, axis: usize, value: f32) -> bool {
        let changed = {
            let mut components = self.inner.components.borrow_mut();
            match components.get_mut(axis) {
                Some(slot) if *slot != value => {
                    *slot = value;
                    true
                }
                _ => false,
            }
        };
        if changed {
            let axis_name = AXES.get(axis).copied().unwrap_or("component");
            self.inner.changed.emit(PropertyChanged::new(axis_name));
        }
        changed
    }

    /// Write every component, emitting one change per axis that differs.
    pub fn assign(&self, components: [f32; N]) -> bool {
        let mut any = false;
        for (axis, value) in components.into_iter().enumerate() {
            any |= self.set_component(axis, value);
        }
        any
    }

    pub fn subscribe(&self, handler: impl Fn(&PropertyChanged) + 'static) -> Uuid {
        self.inner.changed.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.inner.changed.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.changed.observer_count()
    }

    pub fn detached(&self) -> Self {
        Self::new(self.components())
    }
}

macro_rules! axis_accessors {
    ($n:literal, $glam:ty, $($get:ident / $set:ident = $axis:literal),+) => {
        impl ObservableVector<$n> {
            $(
                pub fn $get(&self) -> f32 {
                    self.inner.components.borrow()[$axis]
                }

                pub fn $set(&self, value: f32) -> bool {
                    self.set_component($axis, value)
                }
            )+

            pub fn to_glam(&self) -> $glam {
                <$glam>::from_array(self.components())
            }

            pub fn from_glam(value: $glam) -> Self {
                Self::new(value.to_array())
            }
        }
    };
}

axis_accessors!(2, glam::Vec2, x / set_x = 0, y / set_y = 1);
axis_accessors!(3, glam::Vec3, x / set_x = 0, y / set_y = 1, z / set_z = 2);
axis_accessors!(
    4,
    glam::Vec4,
    x / set_x = 0,
    y / set_y = 1,
    z / set_z = 2,
    w / set_w = 3
);

impl<const N: usize> Clone for ObservableVector<N> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<const N: usize> PartialEq for ObservableVector<N> {
    fn eq(&self, other: &Self) -> bool {
        self.components() == other.components()
    }
}

impl<const N: usize> fmt::Debug for ObservableVector<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec{}{:?}", N, self.components())
    }
}

impl<const N: usize> Reactive for ObservableVector<N> {
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
    use std::cell::RefCell;

    #[test]
    fn test_component_change_names_axis() {
        let v = Vec3::new([1.0, 2.0, 3.0]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        v.subscribe(move |change| s.borrow_mut().push(change.property));

        assert!(v.set_y(5.0));
        assert!(!v.set_y(5.0));
        assert!(v.assign([0.0, 5.0, 0.0]));

        assert_eq!(*seen.borrow(), vec!["y", "x", "z"]);
        assert_eq!(v.components(), [0.0, 5.0, 0.0]);
    }

    #[test]
    fn test_out_of_range_axis_is_ignored() {
        let v = Vec2::zero();
        assert!(!v.set_component(2, 1.0));
        assert_eq!(v.component(2), None);
    }

    #[test]
    fn test_glam_conversion() {
        let v = Vec4::from_glam(glam::Vec4::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(v.w(), 4.0);
        assert_eq!(v.to_glam(), glam::Vec4::new(1.0, 2.0, 3.0, 4.0));
    }
}
