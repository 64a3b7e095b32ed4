use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use super::{CollectionAction, Notifier, PropertyChanged, Reactive};

/// A structural change to an `ObservableList`.
#[derive(Debug, Clone, PartialEq)]
pub enum ListChange<T> {
    Inserted { index: usize, item: T },
    Removed { index: usize, item: T },
    Replaced { index: usize, old: T, new: T },
    Cleared { items: Vec<T> },
}

impl<T> ListChange<T> {
    pub fn action(&self) -> CollectionAction {
        match self {
            ListChange::Inserted { .. } => CollectionAction::Insert,
            ListChange::Removed { .. } => CollectionAction::Remove,
            ListChange::Replaced { .. } => CollectionAction::Replace,
            ListChange::Cleared { .. } => CollectionAction::Clear,
        }
    }
}

/// A field of an element changed while the list itself did not.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemChanged<T> {
    pub item: T,
    pub property: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListEvent<T> {
    Changed(ListChange<T>),
    ItemChanged(ItemChanged<T>),
}

struct Entry<T> {
    item: T,
    subscription: Option<Uuid>,
}

struct ListInner<T: Reactive> {
    entries: RefCell<Vec<Entry<T>>>,
    events: Notifier<ListEvent<T>>,
}

impl<T: Reactive> ListInner<T> {
    fn watch(self: &Rc<Self>, item: &T) -> Option<Uuid> {
        let list = Rc::downgrade(self);
        let watched = item.clone();
        item.observe(Rc::new(move |change: &PropertyChanged| {
            if let Some(list) = list.upgrade() {
                list.events.emit(ListEvent::ItemChanged(ItemChanged {
                    item: watched.clone(),
                    property: change.property,
                }));
            }
        }))
    }
}

impl<T: Reactive> Drop for ListInner<T> {
    fn drop(&mut self) {
        for entry in self.entries.get_mut().drain(..) {
            release(&entry);
        }
    }
}

fn release<T: Reactive>(entry: &Entry<T>) {
    if let Some(subscription) = entry.subscription {
        entry.item.unobserve(subscription);
    }
}

/// An ordered, observable sequence.
///
/// Every insert, removal, replacement and clear emits exactly one
/// `ListEvent::Changed`. Field changes inside an element surface as
/// `ListEvent::ItemChanged`.
pub struct ObservableList<T: Reactive> {
    inner: Rc<ListInner<T>>,
}

impl<T: Reactive> ObservableList<T> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(ListInner {
                entries: RefCell::new(Vec::new()),
                events: Notifier::new(),
            }),
        }
    }

    /// Build a populated list without emitting any notification.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        let list = Self::new();
        let entries: Vec<Entry<T>> = items
            .into_iter()
            .map(|item| Entry {
                subscription: list.inner.watch(&item),
                item,
            })
            .collect();
        *list.inner.entries.borrow_mut() = entries;
        list
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.inner
            .entries
            .borrow()
            .get(index)
            .map(|entry| entry.item.clone())
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.inner
            .entries
            .borrow()
            .iter()
            .map(|entry| entry.item.clone())
            .collect()
    }

    pub fn position(&self, predicate: impl Fn(&T) -> bool) -> Option<usize> {
        self.inner
            .entries
            .borrow()
            .iter()
            .position(|entry| predicate(&entry.item))
    }

    pub fn push(&self, item: T) {
        let index = self.len();
        self.insert(index, item);
    }

    /// Returns false, leaving the list untouched, when `index > len`.
    pub fn insert(&self, index: usize, item: T) -> bool {
        {
            let mut entries = self.inner.entries.borrow_mut();
            if index > entries.len() {
                return false;
            }
            let subscription = self.inner.watch(&item);
            entries.insert(
                index,
                Entry {
                    item: item.clone(),
                    subscription,
                },
            );
        }
        self.inner
            .events
            .emit(ListEvent::Changed(ListChange::Inserted { index, item }));
        true
    }

    pub fn remove_at(&self, index: usize) -> Option<T> {
        let entry = {
            let mut entries = self.inner.entries.borrow_mut();
            if index >= entries.len() {
                return None;
            }
            entries.remove(index)
        };
        release(&entry);
        self.inner.events.emit(ListEvent::Changed(ListChange::Removed {
            index,
            item: entry.item.clone(),
        }));
        Some(entry.item)
    }

    /// Swap the element at `index`, returning the previous one.
    pub fn replace(&self, index: usize, item: T) -> Option<T> {
        let previous = {
            let mut entries = self.inner.entries.borrow_mut();
            let slot = entries.get_mut(index)?;
            let subscription = self.inner.watch(&item);
            std::mem::replace(
                slot,
                Entry {
                    item: item.clone(),
                    subscription,
                },
            )
        };
        release(&previous);
        self.inner.events.emit(ListEvent::Changed(ListChange::Replaced {
            index,
            old: previous.item.clone(),
            new: item,
        }));
        Some(previous.item)
    }

    pub fn clear(&self) {
        let removed: Vec<Entry<T>> = self.inner.entries.borrow_mut().drain(..).collect();
        for entry in &removed {
            release(entry);
        }
        let items = removed.into_iter().map(|entry| entry.item).collect();
        self.inner
            .events
            .emit(ListEvent::Changed(ListChange::Cleared { items }));
    }

    pub fn subscribe(&self, handler: impl Fn(&ListEvent<T>) + 'static) -> Uuid {
        self.inner.events.subscribe(handler)
    }

    pub fn unsubscribe(&self, id: Uuid) -> bool {
        self.inner.events.unsubscribe(id)
    }
}

impl<T: Reactive + PartialEq> ObservableList<T> {
    pub fn contains(&self, item: &T) -> bool {
        self.position(|candidate| candidate == item).is_some()
    }

    /// Remove the first element equal to `item`.
    pub fn remove(&self, item: &T) -> bool {
        match self.position(|candidate| candidate == item) {
            Some(index) => self.remove_at(index).is_some(),
            None => false,
        }
    }
}

impl<T: Reactive> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Reactive> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Reactive + PartialEq> PartialEq for ObservableList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.to_vec() == other.to_vec()
    }
}

impl<T: Reactive + fmt::Debug> fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.inner.entries.borrow().iter().map(|entry| &entry.item))
            .finish()
    }
}

impl<T: Reactive> Reactive for ObservableList<T> {
    fn observe(&self, handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid> {
        Some(self.subscribe(move |_| handler(&PropertyChanged::new("items"))))
    }

    fn unobserve(&self, subscription: Uuid) {
        self.unsubscribe(subscription);
    }
}
