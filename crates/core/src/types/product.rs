//! Product descriptors as published by the catalog.

use serde::{Deserialize, Serialize};

use crate::types::id::ProductId;
use crate::types::price::Price;

/// A product as it appears in the catalog.
///
/// `name`, `description`, and `image` are opaque display fields copied
/// verbatim into the cart on first add; the cart never validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: String,
    /// Reference to the product image (a path or URL), not resolved here.
    pub image: String,
}
