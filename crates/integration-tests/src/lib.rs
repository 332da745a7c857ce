//! Integration test harness for Slice House.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p slice-house-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cross_tab` - Multi-tab synchronization scenarios
//! - `persistence` - Reload and store-fault scenarios
//!
//! The harness here simulates a browser origin: every [`Tab`] gets its own
//! [`CartManager`] and storage-event bus over one shared in-memory store,
//! and a write from one tab delivers a storage event to every *other* tab
//! (the writer never hears its own write, matching browser storage-event
//! semantics). Delivery is synchronous for test determinism; the managers
//! under test make no ordering assumptions either way.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use slice_house_cart::{CartManager, CartStore, MemoryStore, StorageEvent, StorageEventBus};
use slice_house_core::{Price, Product, ProductId};

/// The storage slot all tabs share.
pub const CART_KEY: &str = "cart";

type BusRegistry = Rc<RefCell<Vec<(usize, Rc<StorageEventBus>)>>>;

/// A simulated browser origin: one shared store, any number of tabs.
pub struct BrowserSim {
    store: Rc<MemoryStore>,
    buses: BusRegistry,
    next_tab: Cell<usize>,
}

impl BrowserSim {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Rc::new(MemoryStore::new()),
            buses: Rc::new(RefCell::new(Vec::new())),
            next_tab: Cell::new(0),
        }
    }

    /// Open a tab: a fresh manager over the shared store, attached to its
    /// own event bus. Like a real page load, it reads the current slot.
    #[must_use]
    pub fn open_tab(&self) -> Tab {
        let id = self.next_tab.get();
        self.next_tab.set(id + 1);

        let bus = Rc::new(StorageEventBus::new());
        self.buses.borrow_mut().push((id, Rc::clone(&bus)));

        let tab_store = TabStore {
            tab: id,
            store: Rc::clone(&self.store),
            buses: Rc::clone(&self.buses),
        };
        let manager = CartManager::new(Rc::new(tab_store), CART_KEY);
        manager.attach(&bus);

        Tab {
            id,
            manager,
            bus,
            buses: Rc::clone(&self.buses),
        }
    }

    /// Direct access to the shared store, for seeding or corrupting slots.
    #[must_use]
    pub fn store(&self) -> Rc<MemoryStore> {
        Rc::clone(&self.store)
    }
}

impl Default for BrowserSim {
    fn default() -> Self {
        Self::new()
    }
}

/// One simulated tab: a manager plus its event wiring.
pub struct Tab {
    id: usize,
    manager: CartManager,
    bus: Rc<StorageEventBus>,
    buses: BusRegistry,
}

impl Tab {
    #[must_use]
    pub fn manager(&self) -> &CartManager {
        &self.manager
    }

    /// Number of listeners on this tab's bus (1 while the manager is
    /// attached, 0 after detach).
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.bus.listener_count()
    }

    /// Deliver a raw storage event to this tab only, bypassing the store.
    /// Used to stage races and malformed payloads.
    pub fn deliver(&self, event: &StorageEvent) {
        self.bus.emit(event);
    }
}

impl Drop for Tab {
    fn drop(&mut self) {
        // Closing the tab: its bus leaves the origin's delivery list.
        self.buses.borrow_mut().retain(|(id, _)| *id != self.id);
    }
}

/// Store handle given to each tab: writes go to the shared store and then
/// notify every other tab's bus.
struct TabStore {
    tab: usize,
    store: Rc<MemoryStore>,
    buses: BusRegistry,
}

impl CartStore for TabStore {
    fn save(&self, key: &str, value: &str) {
        self.store.save(key, value);

        let event = StorageEvent {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        };
        let others: Vec<_> = self
            .buses
            .borrow()
            .iter()
            .filter(|(id, _)| *id != self.tab)
            .map(|(_, bus)| Rc::clone(bus))
            .collect();
        for bus in others {
            bus.emit(&event);
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        self.store.load(key)
    }
}

/// Store double where every operation faults: saves are dropped, loads
/// come back absent. Models disabled storage / exceeded quota.
#[derive(Debug, Default)]
pub struct FailingStore;

impl CartStore for FailingStore {
    fn save(&self, _key: &str, _value: &str) {}

    fn load(&self, _key: &str) -> Option<String> {
        None
    }
}

// =============================================================================
// Sample products
// =============================================================================

fn product(id: i32, name: &str, cents: i64, description: &str, image: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Price::from_cents(cents),
        description: description.to_string(),
        image: image.to_string(),
    }
}

#[must_use]
pub fn margherita() -> Product {
    product(
        1,
        "Margherita",
        899,
        "Classic tomato, mozzarella, and basil.",
        "/images/margherita.svg",
    )
}

#[must_use]
pub fn pepperoni() -> Product {
    product(
        2,
        "Pepperoni",
        1099,
        "Spicy pepperoni with our signature sauce.",
        "/images/pepperoni.svg",
    )
}

#[must_use]
pub fn veggie() -> Product {
    product(
        3,
        "Veggie",
        949,
        "Loaded with fresh vegetables and herbs.",
        "/images/veggie.svg",
    )
}
