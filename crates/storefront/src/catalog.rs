//! The static product catalog.
//!
//! Slice House currently sells a fixed menu of three pizzas; the catalog is
//! compiled in rather than fetched. Product descriptors are handed verbatim
//! to the cart on add.

use slice_house_core::{Price, Product, ProductId};

/// All products on the menu, in display order.
#[must_use]
pub fn products() -> Vec<Product> {
    vec![
        Product {
            id: ProductId::new(1),
            name: "Margherita".to_string(),
            price: Price::from_cents(899),
            description: "Classic tomato, mozzarella, and basil.".to_string(),
            image: "/images/margherita.svg".to_string(),
        },
        Product {
            id: ProductId::new(2),
            name: "Pepperoni".to_string(),
            price: Price::from_cents(1099),
            description: "Spicy pepperoni with our signature sauce.".to_string(),
            image: "/images/pepperoni.svg".to_string(),
        },
        Product {
            id: ProductId::new(3),
            name: "Veggie".to_string(),
            price: Price::from_cents(949),
            description: "Loaded with fresh vegetables and herbs.".to_string(),
            image: "/images/veggie.svg".to_string(),
        },
    ]
}

/// Look up a product by id.
#[must_use]
pub fn find(id: ProductId) -> Option<Product> {
    products().into_iter().find(|p| p.id == id)
}
