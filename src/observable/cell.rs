use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use super::{Notifier, PropertyChanged, Reactive};

/// Payload of an `Observable` change.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChanged<T> {
    pub old: T,
    pub new: T,
}

/// A single mutable value that notifies observers when it changes.
///
/// Cloning the handle shares the cell. Setting an equal value is a no-op.
pub struct Observable<T> {
    inner: Rc<CellInner<T>>,
}

struct CellInner<T> {
    value: RefCell<T>,
    changed: Notifier<ValueChanged<T>>,
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(CellInner {
                value: RefCell::new(value),
                changed: Notifier::new(),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Store `value`, returning true when it differed from the current value.
    pub fn set(&self, value: T) -> bool {
        if *self.inner.value.borrow() == value {
            return false;
        }
        let old = self.inner.value.replace(value.clone());
        self.inner.changed.emit(ValueChanged { old, new: value });
        true
    }

    pub fn subscribe(&self, handler: impl Fn(&ValueChanged<T>) + 'static) -> Uuid {
        self.inner.changed.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.inner.changed.unsubscribe(id)
    }

    pub fn observer_count(&self) -> usize {
        self.inner.changed.observer_count()
    }

    /// True when both handles share one cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A new cell holding a copy of the current value.
    pub fn detached(&self) -> Self {
        Self::new(self.get())
    }
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: PartialEq> PartialEq for Observable<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.inner.value.borrow() == *other.inner.value.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Observable")
            .field(&*self.inner.value.borrow())
            .finish()
    }
}

impl<T: Clone + PartialEq + Default + 'static> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> From<T> for Observable<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Clone + PartialEq + 'static> Reactive for Observable<T> {
    fn observe(&self, handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid> {
        Some(self.subscribe(move |_| handler(&PropertyChanged::new("value"))))
    }

    fn unobserve(&self, subscription: Uuid) {
        self.unsubscribe(subscription);
    }
}
