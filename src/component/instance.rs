use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use indexmap::IndexMap;
use uuid::Uuid;

use super::DecodeError;
use crate::identity::{resolve_reference_kind, FileId, InstanceId, ObjectPointer, ReferenceKind};
use crate::observable::{DictionaryEvent, Observable, ObservableDictionary, PropertyChanged, Reactive};
use crate::property::{PropertyKind, PropertyValue};
use crate::schema::{ComponentSchema, FILE_ID_KEY, INSTANCE_ID_KEY};

/// Receives a component instance every time one of its values changes.
pub trait CommitScheduler {
    fn schedule(&self, instance: &ComponentInstance);
}

/// One component as loaded from a document: its schema plus the properties
/// it overrides.
///
/// `values` holds exactly the overridden properties, in document order.
/// Properties not present there take their schema defaults. Any change to a
/// value bumps the revision, raises the dirty flag and hands the instance
/// to the attached commit scheduler.
#[derive(Clone)]
pub struct ComponentInstance {
    inner: Rc<InstanceInner>,
}

struct InstanceInner {
    key: Uuid,
    schema: Arc<ComponentSchema>,
    values: ObservableDictionary<String, PropertyValue>,
    dirty: Observable<bool>,
    revision: Cell<u64>,
    scheduler: RefCell<Option<Weak<dyn CommitScheduler>>>,
}

impl ComponentInstance {
    /// A fresh instance with no overrides.
    pub fn new(schema: Arc<ComponentSchema>) -> Self {
        Self::from_values(schema, IndexMap::new())
    }

    /// Wrap already-decoded values. No change notification is raised and the
    /// instance starts clean.
    pub(crate) fn from_values(
        schema: Arc<ComponentSchema>,
        values: IndexMap<String, PropertyValue>,
    ) -> Self {
        let inner = Rc::new(InstanceInner {
            key: Uuid::new_v4(),
            schema,
            values: ObservableDictionary::from_entries(values),
            dirty: Observable::new(false),
            revision: Cell::new(0),
            scheduler: RefCell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        inner.values.subscribe(move |_| {
            if let Some(inner) = weak.upgrade() {
                ComponentInstance { inner }.on_values_changed();
            }
        });

        Self { inner }
    }

    fn on_values_changed(&self) {
        self.inner.revision.set(self.inner.revision.get() + 1);
        self.inner.dirty.set(true);

        let scheduler = self
            .inner
            .scheduler
            .borrow()
            .as_ref()
            .and_then(Weak::upgrade);
        if let Some(scheduler) = scheduler {
            scheduler.schedule(self);
        }
    }

    /// Process-local identity of this loaded instance.
    pub fn key(&self) -> Uuid {
        self.inner.key
    }

    pub fn schema(&self) -> &Arc<ComponentSchema> {
        &self.inner.schema
    }

    pub fn typename(&self) -> &str {
        self.inner.schema.name()
    }

    /// The overridden value for `key`, if any.
    pub fn property(&self, key: &str) -> Option<PropertyValue> {
        self.inner.values.get(key)
    }

    /// The overridden value for `key`, or a detached copy of the schema default.
    pub fn effective_property(&self, key: &str) -> Option<PropertyValue> {
        self.property(key)
            .or_else(|| self.inner.schema.property(key).map(|kind| kind.default_value()))
    }

    pub fn is_overridden(&self, key: &str) -> bool {
        self.inner.values.contains_key(key)
    }

    /// Overridden keys in document order.
    pub fn keys(&self) -> Vec<String> {
        self.inner.values.keys()
    }

    pub fn entries(&self) -> Vec<(String, PropertyValue)> {
        self.inner.values.entries()
    }

    pub fn len(&self) -> usize {
        self.inner.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.values.is_empty()
    }

    /// Start overriding `key` with its schema default.
    ///
    /// Returns the existing value unchanged when `key` is already overridden.
    pub fn override_property(&self, key: &str) -> Result<PropertyValue, DecodeError> {
        if let Some(existing) = self.property(key) {
            return Ok(existing);
        }
        let kind = self
            .inner
            .schema
            .property(key)
            .ok_or_else(|| DecodeError::UnknownProperty(key.to_string()))?;
        let value = kind.default_value();
        self.inner.values.insert(key.to_string(), value.clone());
        Ok(value)
    }

    /// Store `value` as the override for `key`.
    ///
    /// An enum value must name a member of the property's enum.
    pub fn set_property(&self, key: &str, value: PropertyValue) -> Result<(), DecodeError> {
        let schema = &self.inner.schema;
        let kind = schema
            .property(key)
            .ok_or_else(|| DecodeError::UnknownProperty(key.to_string()))?;
        let is_member = match (kind, &value) {
            (PropertyKind::EnumReference { enum_name, .. }, PropertyValue::Enum(cell)) => {
                let member = cell.get();
                schema
                    .enum_members(enum_name)
                    .map_or(false, |members| members.contains(&member))
            }
            _ => true,
        };
        if !value.matches(kind) || !is_member {
            return Err(DecodeError::ShapeMismatch {
                key: key.to_string(),
                expected: kind.expected_shape(),
            });
        }
        self.inner.values.insert(key.to_string(), value);
        Ok(())
    }

    /// Drop the override for `key` so it falls back to the schema default.
    pub fn revert_property(&self, key: &str) -> Option<PropertyValue> {
        self.inner.values.remove(key)
    }

    /// The `instanceId` override, or the sentinel when there is none.
    pub fn instance_id(&self) -> InstanceId {
        self.property(INSTANCE_ID_KEY)
            .and_then(|value| value.as_instance_reference().map(Observable::get))
            .unwrap_or_default()
    }

    /// The `fileId` override, or the sentinel when there is none.
    pub fn file_id(&self) -> FileId {
        self.property(FILE_ID_KEY)
            .and_then(|value| value.as_file_reference().map(Observable::get))
            .unwrap_or_default()
    }

    /// Resolve the object pointer stored under `key` into asset-or-instance.
    ///
    /// Returns `None` when `key` is not an object pointer property.
    pub fn pointer_reference_kind(&self, key: &str) -> Option<ReferenceKind> {
        let kind = self.inner.schema.property(key)?;
        if !matches!(kind, PropertyKind::ObjectPointer { .. }) {
            return None;
        }
        let pointer = self
            .property(key)
            .and_then(|value| value.as_object_pointer().map(|p| p.get()))
            .unwrap_or_else(ObjectPointer::empty);
        Some(resolve_reference_kind(&pointer, kind.is_instantiable()))
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }

    /// The dirty flag as an observable cell, for UI binding.
    pub fn dirty(&self) -> &Observable<bool> {
        &self.inner.dirty
    }

    /// Incremented on every value change.
    pub fn revision(&self) -> u64 {
        self.inner.revision.get()
    }

    /// Clear the dirty flag if nothing changed since `revision` was encoded.
    pub(crate) fn mark_committed(&self, revision: u64) -> bool {
        if self.inner.revision.get() != revision {
            return false;
        }
        self.inner.dirty.set(false);
        true
    }

    pub fn attach_scheduler(&self, scheduler: Weak<dyn CommitScheduler>) {
        *self.inner.scheduler.borrow_mut() = Some(scheduler);
    }

    pub fn detach_scheduler(&self) {
        *self.inner.scheduler.borrow_mut() = None;
    }

    pub fn subscribe(
        &self,
        handler: impl Fn(&DictionaryEvent<String, PropertyValue>) + 'static,
    ) -> Uuid {
        self.inner.values.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.inner.values.unsubscribe(id)
    }

    pub fn downgrade(&self) -> WeakComponentInstance {
        WeakComponentInstance {
            key: self.inner.key,
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// A deep copy with its own cells and key, not attached to any scheduler.
    pub fn detached(&self) -> Self {
        let values = self
            .entries()
            .into_iter()
            .map(|(key, value)| (key, value.detached()))
            .collect();
        Self::from_values(Arc::clone(&self.inner.schema), values)
    }
}

impl PartialEq for ComponentInstance {
    /// Same component type and equal overrides in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.typename() == other.typename() && self.inner.values == other.inner.values
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("typename", &self.typename())
            .field("key", &self.inner.key)
            .field("values", &self.inner.values)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

impl Reactive for ComponentInstance {
    fn observe(&self, handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid> {
        Some(self.subscribe(move |_| handler(&PropertyChanged::new("values"))))
    }

    fn unobserve(&self, subscription: Uuid) {
        self.unsubscribe(subscription);
    }
}

/// Non-owning handle to a `ComponentInstance`.
#[derive(Clone)]
pub struct WeakComponentInstance {
    key: Uuid,
    inner: Weak<InstanceInner>,
}

impl WeakComponentInstance {
    pub fn key(&self) -> Uuid {
        self.key
    }

    pub fn upgrade(&self) -> Option<ComponentInstance> {
        self.inner.upgrade().map(|inner| ComponentInstance { inner })
    }
}

impl fmt::Debug for WeakComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakComponentInstance({})", self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn schema() -> Arc<ComponentSchema> {
        let registry = SchemaRegistry::load(
            "engineTypes:\n  - typename: Sailor::LightComponent\n    properties:\n      intensity: float\n      owner: class Sailor::TObjectPtr<class Sailor::GameObject>\n    instantiable: [owner]\n",
        )
        .unwrap();
        Arc::clone(registry.lookup_component("Sailor::LightComponent").unwrap())
    }

    fn light(intensity: f32) -> ComponentInstance {
        let mut values = IndexMap::new();
        values.insert("intensity".to_string(), PropertyValue::float(intensity));
        ComponentInstance::from_values(schema(), values)
    }

    #[test]
    fn test_fresh_instance_is_clean() {
        let instance = light(1.0);
        assert!(!instance.is_dirty());
        assert_eq!(instance.revision(), 0);
    }

    #[test]
    fn test_value_change_marks_dirty_and_bumps_revision() {
        let instance = light(1.0);
        let intensity = instance.property("intensity").unwrap();
        intensity.as_float().unwrap().set(2.0);
        assert!(instance.is_dirty());
        assert_eq!(instance.revision(), 1);

        // Equal value is a no-op
        intensity.as_float().unwrap().set(2.0);
        assert_eq!(instance.revision(), 1);
    }

    #[test]
    fn test_mark_committed_requires_matching_revision() {
        let instance = light(1.0);
        instance.property("intensity").unwrap().as_float().unwrap().set(2.0);
        let encoded_at = instance.revision();
        instance.property("intensity").unwrap().as_float().unwrap().set(3.0);

        assert!(!instance.mark_committed(encoded_at));
        assert!(instance.is_dirty());
        assert!(instance.mark_committed(instance.revision()));
        assert!(!instance.is_dirty());
    }

    #[test]
    fn test_override_and_revert() {
        let instance = light(1.0);
        let owner = instance.override_property("owner").unwrap();
        assert_eq!(owner, PropertyValue::object_pointer(ObjectPointer::empty()));
        assert_eq!(instance.keys(), vec!["intensity", "owner"]);

        assert!(instance.revert_property("intensity").is_some());
        assert_eq!(instance.keys(), vec!["owner"]);
        assert_eq!(
            instance.effective_property("intensity"),
            Some(PropertyValue::float(0.0))
        );
        assert_eq!(
            instance.override_property("nope").unwrap_err(),
            DecodeError::UnknownProperty("nope".to_string())
        );
    }

    #[test]
    fn test_set_property_checks_kind() {
        let instance = light(1.0);
        let err = instance
            .set_property("intensity", PropertyValue::vec2(1.0, 2.0))
            .unwrap_err();
        assert!(matches!(err, DecodeError::ShapeMismatch { .. }));
        assert!(instance
            .set_property("intensity", PropertyValue::float(4.0))
            .is_ok());
        assert_eq!(instance.property("intensity"), Some(PropertyValue::float(4.0)));
    }

    #[test]
    fn test_instance_id_falls_back_to_sentinel() {
        let instance = light(1.0);
        assert_eq!(instance.instance_id(), InstanceId::null());

        instance
            .set_property(INSTANCE_ID_KEY, PropertyValue::instance_reference("obj1"))
            .unwrap();
        assert_eq!(instance.instance_id(), InstanceId::new("obj1"));
    }

    #[test]
    fn test_pointer_reference_kind_uses_instantiable_flag() {
        let instance = light(1.0);
        assert_eq!(
            instance.pointer_reference_kind("owner"),
            Some(ReferenceKind::Instance)
        );
        instance
            .set_property(
                "owner",
                PropertyValue::object_pointer(ObjectPointer::to_asset(FileId::new("prefab1"))),
            )
            .unwrap();
        assert_eq!(
            instance.pointer_reference_kind("owner"),
            Some(ReferenceKind::Asset)
        );
        assert_eq!(instance.pointer_reference_kind("intensity"), None);
        assert!(matches!(
            instance.schema().property("owner"),
            Some(PropertyKind::ObjectPointer {
                instantiable: true,
                ..
            })
        ));
    }

    #[test]
    fn test_scheduler_receives_changes() {
        struct Recorder(RefCell<Vec<Uuid>>);
        impl CommitScheduler for Recorder {
            fn schedule(&self, instance: &ComponentInstance) {
                self.0.borrow_mut().push(instance.key());
            }
        }

        let instance = light(1.0);
        let recorder = Rc::new(Recorder(RefCell::new(Vec::new())));
        let scheduler: Rc<dyn CommitScheduler> = recorder.clone();
        instance.attach_scheduler(Rc::downgrade(&scheduler));

        instance.property("intensity").unwrap().as_float().unwrap().set(5.0);
        assert_eq!(*recorder.0.borrow(), vec![instance.key()]);
    }

    #[test]
    fn test_detached_copy_is_equal_but_independent() {
        let instance = light(1.0);
        let copy = instance.detached();
        assert_eq!(instance, copy);
        assert_ne!(instance.key(), copy.key());

        copy.property("intensity").unwrap().as_float().unwrap().set(9.0);
        assert_ne!(instance, copy);
        assert!(!instance.is_dirty());
    }
}
