//! The cart state manager.
//!
//! One manager per execution context. It owns the in-memory [`Cart`],
//! exposes the mutation operations, writes through to the injected
//! [`CartStore`] after every mutation, and notifies an explicit subscriber
//! list so presentation code can re-render. Attached to a
//! [`StorageEvents`] source it also reconciles writes made by other
//! contexts sharing the same store slot.
//!
//! Managers are explicitly constructed and passed down to presentation
//! code as a handle; there is no global instance. The lifecycle is
//! construct-on-startup, [`detach`](CartManager::detach)-on-teardown
//! (`Drop` detaches as a backstop).

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use slice_house_core::{Cart, Price, Product, ProductId};

use crate::store::CartStore;
use crate::sync::{ListenerId, StorageEvents};

/// Handle identifying one registered cart subscriber, for deregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Rc<dyn Fn(&Cart)>;

#[derive(Default)]
struct SubscriberList {
    next_id: u64,
    entries: Vec<(SubscriptionId, Subscriber)>,
}

impl SubscriberList {
    fn add(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, subscriber));
        id
    }

    fn remove(&mut self, id: SubscriptionId) {
        self.entries.retain(|(sid, _)| *sid != id);
    }

    fn snapshot(&self) -> Vec<Subscriber> {
        self.entries
            .iter()
            .map(|(_, subscriber)| Rc::clone(subscriber))
            .collect()
    }
}

struct SyncAttachment {
    events: Rc<dyn StorageEvents>,
    id: ListenerId,
}

/// Owns the in-memory cart for one execution context.
///
/// All operations are synchronous and atomic from the caller's view: the
/// in-memory state reflects the mutation on return, and the persistence
/// write is an immediate fire-and-forget side effect (store faults are
/// swallowed at the adapter).
pub struct CartManager {
    key: String,
    store: Rc<dyn CartStore>,
    cart: Rc<RefCell<Cart>>,
    subscribers: Rc<RefCell<SubscriberList>>,
    sync: RefCell<Option<SyncAttachment>>,
}

impl CartManager {
    /// Construct a manager over `store`, loading the cart saved under
    /// `key`. An absent or unparseable slot yields an empty cart.
    pub fn new(store: Rc<dyn CartStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = store
            .load(&key)
            .map_or_else(Cart::new, |raw| parse_slot(&key, &raw));

        Self {
            key,
            store,
            cart: Rc::new(RefCell::new(cart)),
            subscribers: Rc::new(RefCell::new(SubscriberList::default())),
            sync: RefCell::new(None),
        }
    }

    /// The storage key this manager reads and writes.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// An owned copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.cart.borrow().clone()
    }

    /// The derived total, recomputed from current contents on every call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.cart.borrow().total()
    }

    /// Total unit count across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart.borrow().item_count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.borrow().is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add one unit of `product`, merging into an existing line item with
    /// the same id.
    pub fn add_item(&self, product: &Product) {
        self.mutate(|cart| cart.add(product));
    }

    /// Remove the line item with `id` entirely. Silent no-op if absent.
    pub fn remove_item(&self, id: ProductId) {
        self.mutate(|cart| cart.remove(id));
    }

    /// Set the quantity of the item with `id` to `max(1, qty)`. Never
    /// removes; silent no-op if `id` is absent.
    pub fn update_qty(&self, id: ProductId, qty: u32) {
        self.mutate(|cart| cart.set_qty(id, qty));
    }

    /// Reset the cart to empty (e.g., after a placed order).
    pub fn clear(&self) {
        self.mutate(Cart::clear);
    }

    fn mutate(&self, op: impl FnOnce(&mut Cart)) {
        op(&mut self.cart.borrow_mut());
        self.persist();
        let snapshot = self.cart.borrow().clone();
        notify(&self.subscribers, &snapshot);
    }

    fn persist(&self) {
        // Serialize before calling out so the store never observes a live
        // borrow, even if it delivers events synchronously.
        let serialized = serde_json::to_string(&*self.cart.borrow());
        match serialized {
            Ok(json) => self.store.save(&self.key, &json),
            // Serialization of plain cart data should not fail; if it ever
            // does, keep the in-memory state and skip the write.
            Err(e) => tracing::warn!(key = %self.key, error = %e, "cart persist skipped"),
        }
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Register `subscriber` to be invoked with the post-mutation cart
    /// after every state change, local or cross-tab.
    ///
    /// The callback runs outside the manager's internal borrows, so it may
    /// read the manager (and even mutate it, at the cost of re-notifying).
    pub fn subscribe(&self, subscriber: impl Fn(&Cart) + 'static) -> SubscriptionId {
        self.subscribers.borrow_mut().add(Rc::new(subscriber))
    }

    /// Deregister a subscriber. No-op for an unknown id.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscribers.borrow_mut().remove(id);
    }

    // =========================================================================
    // Cross-tab sync
    // =========================================================================

    /// Attach the cross-tab sync listener to `events`.
    ///
    /// Registered at most once per manager lifetime: repeated calls are
    /// no-ops. On a notification for this manager's key, the carried value
    /// replaces the in-memory cart wholesale (absent value means empty,
    /// malformed value is ignored) and subscribers are notified. The
    /// reconciled state is not written back to the store; the originating
    /// context already did that.
    pub fn attach<E: StorageEvents + 'static>(&self, events: &Rc<E>) {
        let mut sync = self.sync.borrow_mut();
        if sync.is_some() {
            tracing::debug!(key = %self.key, "sync listener already attached");
            return;
        }

        let key = self.key.clone();
        let cart = Rc::downgrade(&self.cart);
        let subscribers = Rc::downgrade(&self.subscribers);
        let id = events.subscribe(Box::new(move |event| {
            if event.key != key {
                return;
            }
            apply_remote(&key, &cart, &subscribers, event.new_value.as_deref());
        }));

        let events: Rc<dyn StorageEvents> = Rc::clone(events) as Rc<dyn StorageEvents>;
        *sync = Some(SyncAttachment { events, id });
    }

    /// Detach the cross-tab sync listener, if attached. Called from `Drop`
    /// so a torn-down manager leaves no orphaned subscription.
    pub fn detach(&self) {
        if let Some(sync) = self.sync.borrow_mut().take() {
            sync.events.unsubscribe(sync.id);
        }
    }
}

impl Drop for CartManager {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("key", &self.key)
            .field("cart", &*self.cart.borrow())
            .field("attached", &self.sync.borrow().is_some())
            .finish_non_exhaustive()
    }
}

/// Parse a loaded slot, degrading to an empty cart on malformed content.
fn parse_slot(key: &str, raw: &str) -> Cart {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "stored cart is malformed, starting empty");
        Cart::new()
    })
}

/// Invoke every subscriber with the post-mutation cart.
///
/// Snapshots the list first so callbacks can subscribe or unsubscribe
/// without poisoning the iteration.
fn notify(subscribers: &RefCell<SubscriberList>, cart: &Cart) {
    for subscriber in subscribers.borrow().snapshot() {
        subscriber(cart);
    }
}

/// Reconcile a storage-change notification from another context.
///
/// Last write wins: a parseable value replaces local state wholesale, an
/// absent value empties the cart, and a malformed value is ignored.
fn apply_remote(
    key: &str,
    cart: &Weak<RefCell<Cart>>,
    subscribers: &Weak<RefCell<SubscriberList>>,
    new_value: Option<&str>,
) {
    let (Some(cart), Some(subscribers)) = (cart.upgrade(), subscribers.upgrade()) else {
        // Manager already torn down; nothing to reconcile.
        return;
    };

    let next = match new_value {
        Some(raw) => match serde_json::from_str(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!(key, error = %e, "ignoring malformed cross-tab cart payload");
                return;
            }
        },
        None => Cart::new(),
    };

    *cart.borrow_mut() = next;
    let snapshot = cart.borrow().clone();
    notify(&subscribers, &snapshot);
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use slice_house_core::Price;

    use super::*;
    use crate::store::MemoryStore;
    use crate::sync::{StorageEvent, StorageEventBus};

    fn margherita() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Margherita".to_string(),
            price: Price::from_cents(899),
            description: "Classic tomato, mozzarella, and basil.".to_string(),
            image: "/images/margherita.svg".to_string(),
        }
    }

    fn pepperoni() -> Product {
        Product {
            id: ProductId::new(2),
            name: "Pepperoni".to_string(),
            price: Price::from_cents(1099),
            description: "Spicy pepperoni with our signature sauce.".to_string(),
            image: "/images/pepperoni.svg".to_string(),
        }
    }

    fn manager_over(store: &Rc<MemoryStore>) -> CartManager {
        CartManager::new(Rc::clone(store) as Rc<dyn CartStore>, "cart")
    }

    // =========================================================================
    // Construction and persistence
    // =========================================================================

    #[test]
    fn test_fresh_store_yields_empty_cart() {
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        assert!(manager.is_empty());
        assert_eq!(manager.total(), Price::ZERO);
    }

    #[test]
    fn test_malformed_slot_yields_empty_cart() {
        let store = Rc::new(MemoryStore::new());
        store.save("cart", "{not json");

        let manager = manager_over(&store);
        assert!(manager.is_empty());
    }

    #[test]
    fn test_every_mutation_writes_through() {
        let store = Rc::new(MemoryStore::new());
        let manager = manager_over(&store);

        manager.add_item(&margherita());
        let after_add = store.load("cart").expect("persisted after add");
        assert!(after_add.contains("\"qty\":1"));

        manager.update_qty(ProductId::new(1), 3);
        let after_update = store.load("cart").expect("persisted after update");
        assert!(after_update.contains("\"qty\":3"));

        manager.clear();
        assert_eq!(store.load("cart").as_deref(), Some("[]"));
    }

    #[test]
    fn test_reload_after_clear_is_empty() {
        let store = Rc::new(MemoryStore::new());
        let manager = manager_over(&store);
        manager.add_item(&margherita());
        manager.clear();

        // Fresh manager over the same slot, as on a page reload.
        let reloaded = manager_over(&store);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_reload_roundtrips_cart_contents() {
        let store = Rc::new(MemoryStore::new());
        let manager = manager_over(&store);
        manager.add_item(&margherita());
        manager.add_item(&pepperoni());
        manager.update_qty(ProductId::new(2), 3);

        let reloaded = manager_over(&store);
        assert_eq!(reloaded.snapshot(), manager.snapshot());
    }

    // =========================================================================
    // Operations
    // =========================================================================

    #[test]
    fn test_add_item_merges_by_id() {
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        for _ in 0..4 {
            manager.add_item(&margherita());
        }

        let cart = manager.snapshot();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().expect("one item").qty, 4);
    }

    #[test]
    fn test_update_qty_clamps_below_one() {
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());

        manager.update_qty(ProductId::new(1), 0);

        let cart = manager.snapshot();
        assert_eq!(cart.items().first().expect("still present").qty, 1);
    }

    #[test]
    fn test_remove_item_unknown_id_leaves_cart_unchanged() {
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());
        let before = manager.snapshot();

        manager.remove_item(ProductId::new(42));

        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_total_recomputes_per_call() {
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());
        assert_eq!(manager.total(), Price::from_cents(899));

        manager.add_item(&pepperoni());
        assert_eq!(manager.total(), Price::from_cents(1998));
    }

    // =========================================================================
    // Observers
    // =========================================================================

    #[test]
    fn test_subscriber_fires_once_per_mutation_with_post_state() {
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        let seen: Rc<RefCell<Vec<u32>>> = Rc::new(RefCell::new(Vec::new()));

        let seen_by_subscriber = Rc::clone(&seen);
        manager.subscribe(move |cart| {
            seen_by_subscriber.borrow_mut().push(cart.item_count());
        });

        manager.add_item(&margherita());
        manager.add_item(&margherita());
        manager.clear();

        assert_eq!(*seen.borrow(), vec![1, 2, 0]);
    }

    #[test]
    fn test_unsubscribed_callback_stops_firing() {
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        let count = Rc::new(Cell::new(0));

        let count_by_subscriber = Rc::clone(&count);
        let id = manager.subscribe(move |_| {
            count_by_subscriber.set(count_by_subscriber.get() + 1);
        });

        manager.add_item(&margherita());
        manager.unsubscribe(id);
        manager.add_item(&margherita());

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_subscriber_may_read_the_manager() {
        let manager = Rc::new(manager_over(&Rc::new(MemoryStore::new())));
        let observed_total = Rc::new(RefCell::new(Price::ZERO));

        let manager_for_subscriber = Rc::clone(&manager);
        let observed = Rc::clone(&observed_total);
        manager.subscribe(move |_| {
            *observed.borrow_mut() = manager_for_subscriber.total();
        });

        manager.add_item(&margherita());
        assert_eq!(*observed_total.borrow(), Price::from_cents(899));
    }

    // =========================================================================
    // Cross-tab sync
    // =========================================================================

    #[test]
    fn test_remote_value_replaces_state_wholesale() {
        let bus = Rc::new(StorageEventBus::new());
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());
        manager.attach(&bus);

        let mut remote = Cart::new();
        remote.add(&pepperoni());
        let payload = serde_json::to_string(&remote).expect("serialize");

        bus.emit(&StorageEvent {
            key: "cart".to_string(),
            new_value: Some(payload),
        });

        assert_eq!(manager.snapshot(), remote);
    }

    #[test]
    fn test_remote_absent_value_empties_the_cart() {
        let bus = Rc::new(StorageEventBus::new());
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());
        manager.attach(&bus);

        bus.emit(&StorageEvent {
            key: "cart".to_string(),
            new_value: None,
        });

        assert!(manager.is_empty());
    }

    #[test]
    fn test_remote_malformed_value_retains_state() {
        let bus = Rc::new(StorageEventBus::new());
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());
        manager.attach(&bus);
        let before = manager.snapshot();

        bus.emit(&StorageEvent {
            key: "cart".to_string(),
            new_value: Some("{not json".to_string()),
        });

        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_event_for_other_key_is_ignored() {
        let bus = Rc::new(StorageEventBus::new());
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());
        manager.attach(&bus);
        let before = manager.snapshot();

        bus.emit(&StorageEvent {
            key: "session".to_string(),
            new_value: Some("[]".to_string()),
        });

        assert_eq!(manager.snapshot(), before);
    }

    #[test]
    fn test_remote_replacement_notifies_subscribers() {
        let bus = Rc::new(StorageEventBus::new());
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.attach(&bus);

        let count = Rc::new(Cell::new(0));
        let count_by_subscriber = Rc::clone(&count);
        manager.subscribe(move |_| {
            count_by_subscriber.set(count_by_subscriber.get() + 1);
        });

        bus.emit(&StorageEvent {
            key: "cart".to_string(),
            new_value: Some("[]".to_string()),
        });

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_attach_is_idempotent() {
        let bus = Rc::new(StorageEventBus::new());
        let manager = manager_over(&Rc::new(MemoryStore::new()));

        manager.attach(&bus);
        manager.attach(&bus);

        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_drop_detaches_the_listener() {
        let bus = Rc::new(StorageEventBus::new());
        {
            let manager = manager_over(&Rc::new(MemoryStore::new()));
            manager.attach(&bus);
            assert_eq!(bus.listener_count(), 1);
        }
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_explicit_detach_then_events_are_ignored() {
        let bus = Rc::new(StorageEventBus::new());
        let manager = manager_over(&Rc::new(MemoryStore::new()));
        manager.add_item(&margherita());
        manager.attach(&bus);
        manager.detach();

        bus.emit(&StorageEvent {
            key: "cart".to_string(),
            new_value: None,
        });

        assert!(!manager.is_empty());
        assert_eq!(bus.listener_count(), 0);
    }
}
