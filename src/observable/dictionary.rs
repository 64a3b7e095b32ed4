use std::cell::RefCell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

use indexmap::{Equivalent, IndexMap};
use uuid::Uuid;

use super::{CollectionAction, Notifier, PropertyChanged, Reactive};

/// A structural change to an `ObservableDictionary`.
#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryChange<K, V> {
    Added { key: K, value: V },
    Removed { key: K, value: V },
    Replaced { key: K, old: V, new: V },
    Cleared { entries: Vec<(K, V)> },
}

impl<K, V> DictionaryChange<K, V> {
    pub fn action(&self) -> CollectionAction {
        match self {
            DictionaryChange::Added { .. } => CollectionAction::Insert,
            DictionaryChange::Removed { .. } => CollectionAction::Remove,
            DictionaryChange::Replaced { .. } => CollectionAction::Replace,
            DictionaryChange::Cleared { .. } => CollectionAction::Clear,
        }
    }

    /// The key touched, or `None` for a clear.
    pub fn key(&self) -> Option<&K> {
        match self {
            DictionaryChange::Added { key, .. }
            | DictionaryChange::Removed { key, .. }
            | DictionaryChange::Replaced { key, .. } => Some(key),
            DictionaryChange::Cleared { .. } => None,
        }
    }
}

/// A field of a stored value changed while the key set did not.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryChanged<K, V> {
    pub key: K,
    pub value: V,
    pub property: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictionaryEvent<K, V> {
    Changed(DictionaryChange<K, V>),
    EntryChanged(EntryChanged<K, V>),
}

struct Entry<V> {
    value: V,
    subscription: Option<Uuid>,
}

struct DictionaryInner<K, V: Reactive> {
    entries: RefCell<IndexMap<K, Entry<V>>>,
    events: Notifier<DictionaryEvent<K, V>>,
}

impl<K, V> DictionaryInner<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Reactive,
{
    fn watch(self: &Rc<Self>, key: &K, value: &V) -> Option<Uuid> {
        let dictionary = Rc::downgrade(self);
        let key = key.clone();
        let watched = value.clone();
        value.observe(Rc::new(move |change: &PropertyChanged| {
            if let Some(dictionary) = dictionary.upgrade() {
                dictionary
                    .events
                    .emit(DictionaryEvent::EntryChanged(EntryChanged {
                        key: key.clone(),
                        value: watched.clone(),
                        property: change.property,
                    }));
            }
        }))
    }
}

impl<K, V: Reactive> Drop for DictionaryInner<K, V> {
    fn drop(&mut self) {
        for (_, entry) in self.entries.get_mut().drain(..) {
            release(&entry);
        }
    }
}

fn release<V: Reactive>(entry: &Entry<V>) {
    if let Some(subscription) = entry.subscription {
        entry.value.unobserve(subscription);
    }
}

/// An insertion-ordered, observable key-value map.
pub struct ObservableDictionary<K, V: Reactive> {
    inner: Rc<DictionaryInner<K, V>>,
}

impl<K, V> ObservableDictionary<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Reactive,
{
    pub fn new() -> Self {
        Self {
            inner: Rc::new(DictionaryInner {
                entries: RefCell::new(IndexMap::new()),
                events: Notifier::new(),
            }),
        }
    }

    /// Build a populated dictionary without emitting any notification.
    pub fn from_entries(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        let dictionary = Self::new();
        let populated: IndexMap<K, Entry<V>> = entries
            .into_iter()
            .map(|(key, value)| {
                let subscription = dictionary.inner.watch(&key, &value);
                (
                    key,
                    Entry {
                        value,
                        subscription,
                    },
                )
            })
            .collect();
        *dictionary.inner.entries.borrow_mut() = populated;
        dictionary
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.inner.entries.borrow().contains_key(key)
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.inner
            .entries
            .borrow()
            .get(key)
            .map(|entry| entry.value.clone())
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.entries.borrow().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.inner
            .entries
            .borrow()
            .values()
            .map(|entry| entry.value.clone())
            .collect()
    }

    /// Key-value pairs in insertion order.
    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|(key, entry)| (key.clone(), entry.value.clone()))
            .collect()
    }

    /// Add or replace. Replacing keeps the key's position.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let previous = {
            let mut entries = self.inner.entries.borrow_mut();
            let subscription = self.inner.watch(&key, &value);
            entries.insert(
                key.clone(),
                Entry {
                    value: value.clone(),
                    subscription,
                },
            )
        };

        let change = match &previous {
            Some(old) => {
                release(old);
                DictionaryChange::Replaced {
                    key,
                    old: old.value.clone(),
                    new: value,
                }
            }
            None => DictionaryChange::Added { key, value },
        };
        self.inner.events.emit(DictionaryEvent::Changed(change));
        previous.map(|entry| entry.value)
    }

    /// Remove `key`, keeping the order of the remaining entries.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        let (_, key, removed) = self.inner.entries.borrow_mut().shift_remove_full(key)?;
        release(&removed);
        self.inner
            .events
            .emit(DictionaryEvent::Changed(DictionaryChange::Removed {
                key,
                value: removed.value.clone(),
            }));
        Some(removed.value)
    }

    pub fn clear(&self) {
        let removed: Vec<(K, Entry<V>)> = self.inner.entries.borrow_mut().drain(..).collect();
        for (_, entry) in &removed {
            release(entry);
        }
        let entries = removed
            .into_iter()
            .map(|(key, entry)| (key, entry.value))
            .collect();
        self.inner
            .events
            .emit(DictionaryEvent::Changed(DictionaryChange::Cleared { entries }));
    }

    pub fn subscribe(&self, handler: impl Fn(&DictionaryEvent<K, V>) + 'static) -> Uuid {
        self.inner.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.inner.events.unsubscribe(id)
    }
}

impl<K, V> Default for ObservableDictionary<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Reactive,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V: Reactive> Clone for ObservableDictionary<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> PartialEq for ObservableDictionary<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Reactive + PartialEq,
{
    /// Order-sensitive: equal dictionaries hold equal entries in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.entries() == other.entries()
    }
}

impl<K: fmt::Debug, V: Reactive + fmt::Debug> fmt::Debug for ObservableDictionary<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.inner
                    .entries
                    .borrow()
                    .iter()
                    .map(|(key, entry)| (key, &entry.value)),
            )
            .finish()
    }
}

impl<K, V> Reactive for ObservableDictionary<K, V>
where
    K: Clone + Eq + Hash + 'static,
    V: Reactive,
{
    fn observe(&self, handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid> {
        Some(self.subscribe(move |_| handler(&PropertyChanged::new("entries"))))
    }

    fn unobserve(&self, subscription: Uuid) {
        self.unsubscribe(subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::Observable;

    type Events = Rc<RefCell<Vec<DictionaryEvent<String, Observable<i32>>>>>;

    fn recorder(dictionary: &ObservableDictionary<String, Observable<i32>>) -> Events {
        let events: Events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        dictionary.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    #[test]
    fn test_insertion_order_is_kept_across_replace_and_remove() {
        let dictionary = ObservableDictionary::from_entries(vec![
            ("b".to_string(), Observable::new(1)),
            ("a".to_string(), Observable::new(2)),
            ("c".to_string(), Observable::new(3)),
        ]);

        dictionary.insert("a".to_string(), Observable::new(20));
        dictionary.remove("b");
        dictionary.insert("d".to_string(), Observable::new(4));

        assert_eq!(dictionary.keys(), vec!["a", "c", "d"]);
        assert_eq!(dictionary.get("a").map(|v| v.get()), Some(20));
    }

    #[test]
    fn test_structural_events() {
        let dictionary = ObservableDictionary::new();
        let events = recorder(&dictionary);

        dictionary.insert("x".to_string(), Observable::new(1));
        dictionary.insert("x".to_string(), Observable::new(2));
        dictionary.remove("x");
        dictionary.remove("missing");
        dictionary.clear();

        let actions: Vec<CollectionAction> = events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                DictionaryEvent::Changed(change) => Some(change.action()),
                DictionaryEvent::EntryChanged(_) => None,
            })
            .collect();
        assert_eq!(
            actions,
            vec![
                CollectionAction::Insert,
                CollectionAction::Replace,
                CollectionAction::Remove,
                CollectionAction::Clear,
            ]
        );
    }

    #[test]
    fn test_value_change_surfaces_as_entry_changed() {
        let cell = Observable::new(1);
        let dictionary = ObservableDictionary::from_entries(vec![("k".to_string(), cell.clone())]);
        let events = recorder(&dictionary);

        cell.set(2);
        cell.set(2);

        let events = events.borrow();
        assert_eq!(events.len(), 1);
        match &events[0] {
            DictionaryEvent::EntryChanged(change) => assert_eq!(change.key, "k"),
            other => panic!("expected entry change, got {:?}", other),
        }
    }

    #[test]
    fn test_replaced_value_is_released() {
        let old = Observable::new(1);
        let dictionary = ObservableDictionary::from_entries(vec![("k".to_string(), old.clone())]);
        dictionary.insert("k".to_string(), Observable::new(5));
        assert_eq!(old.observer_count(), 0);

        let events = recorder(&dictionary);
        old.set(3);
        assert!(events.borrow().is_empty());
    }
}
