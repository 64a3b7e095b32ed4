//! Observable primitives
//!
//! The property model is built from four pieces: a single-value cell
//! (`Observable`), compound values that report field changes, and the two
//! containers (`ObservableList`, `ObservableDictionary`). Containers forward
//! field changes of their elements as a distinct item-changed event so
//! consumers can tell "the set changed" apart from "a member changed".
//!
//! Everything here is single-threaded (`Rc`/`RefCell`). The reactive graph
//! belongs to the thread that created it.

mod cell;
mod dictionary;
mod list;
mod notifier;

pub use cell::{Observable, ValueChanged};
pub use dictionary::{DictionaryChange, DictionaryEvent, EntryChanged, ObservableDictionary};
pub use list::{ItemChanged, ListChange, ListEvent, ObservableList};
pub use notifier::{Handler, Notifier};

use std::rc::Rc;

use uuid::Uuid;

use crate::identity::{FileId, InstanceId, ObjectPointer};

/// A field of a compound value changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChanged {
    pub property: &'static str,
}

impl PropertyChanged {
    pub fn new(property: &'static str) -> Self {
        Self { property }
    }
}

/// Kind of structural change applied to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionAction {
    Insert,
    Remove,
    Replace,
    Clear,
}

/// Values a container can watch for field changes.
///
/// Plain values have nothing to observe and return `None`.
pub trait Reactive: Clone + 'static {
    fn observe(&self, handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid>;
    fn unobserve(&self, subscription: Uuid);
}

macro_rules! inert_reactive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Reactive for $ty {
                fn observe(&self, _handler: Rc<dyn Fn(&PropertyChanged)>) -> Option<Uuid> {
                    None
                }

                fn unobserve(&self, _subscription: Uuid) {}
            }
        )*
    };
}

inert_reactive!(
    String,
    bool,
    i32,
    i64,
    u32,
    u64,
    f32,
    f64,
    FileId,
    InstanceId,
    ObjectPointer,
);
