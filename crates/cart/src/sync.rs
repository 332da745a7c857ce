//! Cross-tab sync protocol: storage-change notifications.
//!
//! When another execution context sharing the origin's store writes the
//! cart slot, this context receives a [`StorageEvent`] carrying the key and
//! the new value (or `None` for a cleared slot). The event source is an
//! injected capability ([`StorageEvents`]) rather than a platform API so
//! the test suite can drive a fake emitter; [`StorageEventBus`] is the
//! in-process implementation used by both the app and the tests.
//!
//! Delivery is asynchronous and unordered relative to local mutations.
//! There is no merge: a received value replaces local state wholesale
//! (last write wins).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Notification that a store key changed in another execution context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The store key that changed.
    pub key: String,
    /// The new serialized value, or `None` if the slot was cleared.
    pub new_value: Option<String>,
}

/// Handle identifying one registered listener, for deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Capability for receiving storage-change notifications.
///
/// A listener registered through `subscribe` stays registered until the
/// returned [`ListenerId`] is passed to `unsubscribe`; droppable wrappers
/// (like the manager's sync attachment) are responsible for doing so.
pub trait StorageEvents {
    fn subscribe(&self, listener: Box<dyn Fn(&StorageEvent)>) -> ListenerId;
    fn unsubscribe(&self, id: ListenerId);
}

/// In-process storage event source.
///
/// [`emit`](Self::emit) delivers to every registered listener. The listener
/// list is snapshotted per emission, so listeners may subscribe or
/// unsubscribe (including themselves) from inside a callback.
#[derive(Default)]
pub struct StorageEventBus {
    next_id: Cell<u64>,
    listeners: RefCell<Vec<(ListenerId, Rc<dyn Fn(&StorageEvent)>)>>,
}

impl StorageEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` to all currently registered listeners.
    pub fn emit(&self, event: &StorageEvent) {
        let snapshot: Vec<_> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl StorageEvents for StorageEventBus {
    fn subscribe(&self, listener: Box<dyn Fn(&StorageEvent)>) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().push((id, Rc::from(listener)));
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(lid, _)| *lid != id);
    }
}

impl std::fmt::Debug for StorageEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEventBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
