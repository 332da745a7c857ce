//! The cart aggregate: an ordered, unique-by-id collection of line items.
//!
//! This is the pure half of the cart subsystem. Persistence, subscriptions,
//! and cross-tab reconciliation live in the `cart` crate; everything here is
//! plain data manipulation so the invariants are testable in isolation:
//!
//! - no two line items share an id (adding an existing id merges),
//! - every line item has `qty >= 1` (quantity updates clamp, never remove),
//! - insertion order is first-add order and survives quantity updates,
//! - totals are derived on demand, never stored.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;
use crate::types::product::Product;

/// One product entry in the cart with an associated quantity.
///
/// The display fields are copied verbatim from the [`Product`] at first add.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    pub image: String,
    /// Always `>= 1`; an item that would drop to zero is removed instead.
    pub qty: u32,
}

impl LineItem {
    fn first_add(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            description: product.description.clone(),
            image: product.image.clone(),
            qty: 1,
        }
    }

    /// The price of this line: unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.qty)
    }
}

/// The ordered, unique-by-id collection of selected products.
///
/// Serializes transparently as a JSON array of line items, which is exactly
/// the persisted storage-slot layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// The line items in first-add order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items (not total quantity).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add one unit of `product`.
    ///
    /// If an item with the same id already exists its quantity is
    /// incremented; otherwise a new line item with `qty = 1` is appended.
    /// A merge never moves the item within the cart.
    pub fn add(&mut self, product: &Product) {
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == product.id) {
            existing.qty += 1;
        } else {
            self.items.push(LineItem::first_add(product));
        }
    }

    /// Remove the line item with `id` entirely. No-op if absent.
    pub fn remove(&mut self, id: ProductId) {
        self.items.retain(|i| i.id != id);
    }

    /// Set the quantity of the item with `id` to `max(1, qty)`.
    ///
    /// Values below 1 are clamped up; this operation never removes an item
    /// ([`Cart::remove`] is the only removal path). No-op if `id` is absent.
    pub fn set_qty(&mut self, id: ProductId, qty: u32) {
        if let Some(item) = self.items.iter_mut().find(|i| i.id == id) {
            item.qty = qty.max(1);
        }
    }

    /// Remove all line items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The monetary total, recomputed from current contents on every call.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(LineItem::line_total).sum()
    }

    /// Total unit count across all line items (the header badge number).
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.qty).sum()
    }
}
