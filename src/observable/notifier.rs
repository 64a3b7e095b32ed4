//! Ordered, synchronous change delivery
//!
//! Every observable in this crate owns a `Notifier`. Delivery happens on the
//! calling thread, observers run in subscription order, and an event raised
//! by an observer while another event is being delivered is queued behind
//! it, so observers always see events in the order mutations were applied.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use uuid::Uuid;

pub type Handler<E> = Rc<dyn Fn(&E)>;

pub struct Notifier<E> {
    handlers: RefCell<Vec<(Uuid, Handler<E>)>>,
    pending: RefCell<VecDeque<E>>,
    delivering: Cell<bool>,
}

impl<E> Notifier<E> {
    pub fn new() -> Self {
        Self {
            handlers: RefCell::new(Vec::new()),
            pending: RefCell::new(VecDeque::new()),
            delivering: Cell::new(false),
        }
    }

    pub fn subscribe(&self, handler: impl Fn(&E) + 'static) -> Uuid {
        self.subscribe_rc(Rc::new(handler))
    }

    pub fn subscribe_rc(&self, handler: Handler<E>) -> Uuid {
        let id = Uuid::new_v4();
        self.handlers.borrow_mut().push((id, handler));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&self, id: Uuid) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    pub fn emit(&self, event: E) {
        self.pending.borrow_mut().push_back(event);
        if self.delivering.get() {
            return;
        }

        let _guard = DeliveryGuard::enter(self);
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };
            // Snapshot so observers may subscribe or unsubscribe mid-delivery
            let handlers: Vec<Handler<E>> = self
                .handlers
                .borrow()
                .iter()
                .map(|(_, handler)| Rc::clone(handler))
                .collect();
            for handler in handlers {
                handler(&event);
            }
        }
    }
}

impl<E> Default for Notifier<E> {
    fn default() -> Self {
        Self::new()
    }
}

struct DeliveryGuard<'a, E> {
    notifier: &'a Notifier<E>,
}

impl<'a, E> DeliveryGuard<'a, E> {
    fn enter(notifier: &'a Notifier<E>) -> Self {
        notifier.delivering.set(true);
        Self { notifier }
    }
}

impl<E> Drop for DeliveryGuard<'_, E> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.notifier.pending.borrow_mut().clear();
        }
        self.notifier.delivering.set(false);
    }
}
