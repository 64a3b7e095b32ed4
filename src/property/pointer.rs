use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::identity::{FileId, InstanceId, ObjectPointer};
use crate::observable::{Notifier, PropertyChanged, Reactive};

/// An object pointer slot whose two halves are observable.
pub struct ObservablePointer {
    inner: Rc<PointerInner>,
}

struct PointerInner {
    value: RefCell<ObjectPointer>,
    changed: Notifier<PropertyChanged>,
}

impl ObservablePointer {
    pub fn new(pointer: ObjectPointer) -> Self {
        Self {
            inner: Rc::new(PointerInner {
                value: RefCell::new(pointer),
                changed: Notifier::new(),
            }),
        }
    }

    pub fn empty() -> Self {
        Self::new(ObjectPointer::empty())
    }

    pub fn get(&self) -> ObjectPointer {
        self.inner.value.borrow().clone()
    }

    pub fn file_id(&self) -> FileId {
        self.inner.value.borrow().file_id.clone()
    }

    pub fn instance_id(&self) -> InstanceId {
        self.inner.value.borrow().instance_id.clone()
    }

    pub fn set_file_id(&self, file_id: FileId) -> bool {
        let changed = {
            let mut value = self.inner.value.borrow_mut();
            if value.file_id == file_id {
                false
            } else {
                value.file_id = file_id;
                true
            }
        };
        if changed {
            self.inner.changed.emit(PropertyChanged::new("fileId"));
        }
        changed
    }

    pub fn set_instance_id(&self, instance_id: InstanceId) -> bool {
        let changed = {
            let mut value = self.inner.value.borrow_mut();
            if value.instance_id == instance_id {
                false
            } else {
                value.instance_id = instance_id;
                true
            }
        };
        if changed {
            self.inner.changed.emit(PropertyChanged::new("instanceId"));
        }
        changed
    }

    /// Replace both halves, emitting one change per half that differs.
    pub fn set(&self, pointer: ObjectPointer) -> bool {
        let file_changed = self.set_file_id(pointer.file_id);
        let instance_changed = self.set_instance_id(pointer.instance_id);
        file_changed || instance_changed
    }

    /// Point at an asset, clearing any instance reference.
    pub fn point_to_asset(&self, file_id: FileId) -> bool {
        self.set(ObjectPointer::to_asset(file_id))
    }

    /// Point at a live instance, clearing any asset reference.
    pub fn point_to_instance(&self, instance_id: InstanceId) -> bool {
        self.set(ObjectPointer::to_instance(instance_id))
    }

    pub fn subscribe(&self, handler: impl Fn(&PropertyChanged) + 'static) -> Uuid {
        self.inner.changed.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.inner.changed.unsubscribe(id)
    }

    pub fn detached(&self) -> Self {
        Self::new(self.get())
    }
}

impl Clone for ObservablePointer {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl PartialEq for ObservablePointer {
    fn eq(&self, other: &Self) -> bool {
        *self.inner.value.borrow() == *other.inner.value.borrow()
    }
}

impl fmt::Debug for ObservablePointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner.value.borrow(), f)
    }
}

impl Reactive for ObservablePointer {
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
    fn test_point_to_asset_clears_instance() {
        let pointer = ObservablePointer::new(ObjectPointer::to_instance(InstanceId::new("obj1")));
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        pointer.subscribe(move |change| s.borrow_mut().push(change.property));

        assert!(pointer.point_to_asset(FileId::new("mesh7")));
        assert_eq!(pointer.file_id(), FileId::new("mesh7"));
        assert!(pointer.instance_id().is_empty());
        assert_eq!(*seen.borrow(), vec!["fileId", "instanceId"]);
    }
}
