//! Display data and renderers for the terminal storefront.
//!
//! View structs carry pre-formatted strings so rendering is a dumb join;
//! all money formatting happens at the conversion boundary.

use std::fmt::Write as _;

use slice_house_core::{Cart, Product};

/// Cart line display data.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

/// Cart display data.
#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u32,
}

impl CartView {
    /// Create an empty cart view.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|line| CartItemView {
                    id: line.id.to_string(),
                    name: line.name.clone(),
                    quantity: line.qty,
                    price: line.price.to_string(),
                    line_price: line.line_total().to_string(),
                })
                .collect(),
            subtotal: cart.total().to_string(),
            item_count: cart.item_count(),
        }
    }
}

/// Render the menu listing.
#[must_use]
pub fn render_menu(products: &[Product]) -> String {
    let mut out = String::from("Menu\n");
    for product in products {
        let _ = writeln!(
            out,
            "  [{}] {} - {}\n      {}",
            product.id, product.name, product.price, product.description
        );
    }
    out
}

/// Render the cart summary panel.
#[must_use]
pub fn render_cart(view: &CartView) -> String {
    let mut out = String::from("Your Cart\n");
    if view.items.is_empty() {
        out.push_str("  Your cart is empty\n");
    } else {
        for item in &view.items {
            let _ = writeln!(
                out,
                "  [{}] {} x{} @ {} = {}",
                item.id, item.name, item.quantity, item.price, item.line_price
            );
        }
    }
    let _ = writeln!(out, "  Total: {}", view.subtotal);
    out
}

/// Render the header badge, mirroring the original `Order (N)` nav link.
#[must_use]
pub fn render_badge(item_count: u32) -> String {
    format!("Order ({item_count})")
}

#[cfg(test)]
mod tests {
    use slice_house_core::ProductId;

    use super::*;
    use crate::catalog;

    fn two_line_cart() -> Cart {
        let mut cart = Cart::new();
        for product in catalog::products().iter().take(2) {
            cart.add(product);
        }
        cart.set_qty(ProductId::new(1), 2);
        cart
    }

    #[test]
    fn test_cart_view_formats_prices() {
        let view = CartView::from(&two_line_cart());

        assert_eq!(view.item_count, 3);
        // 2 * 8.99 + 10.99
        assert_eq!(view.subtotal, "$28.97");

        let first = view.items.first().expect("first line");
        assert_eq!(first.price, "$8.99");
        assert_eq!(first.line_price, "$17.98");
        assert_eq!(first.quantity, 2);
    }

    #[test]
    fn test_empty_view_matches_empty_cart_conversion() {
        let from_cart = CartView::from(&Cart::new());
        let empty = CartView::empty();

        assert!(from_cart.items.is_empty());
        assert_eq!(from_cart.subtotal, empty.subtotal);
        assert_eq!(from_cart.item_count, empty.item_count);
    }

    #[test]
    fn test_render_cart_empty_message() {
        let out = render_cart(&CartView::empty());
        assert!(out.contains("Your cart is empty"));
        assert!(out.contains("Total: $0.00"));
    }

    #[test]
    fn test_render_cart_lines() {
        let out = render_cart(&CartView::from(&two_line_cart()));
        assert!(out.contains("Margherita x2 @ $8.99 = $17.98"));
        assert!(out.contains("Pepperoni x1"));
        assert!(out.contains("Total: $28.97"));
    }

    #[test]
    fn test_render_menu_lists_all_products() {
        let out = render_menu(&catalog::products());
        assert!(out.contains("[1] Margherita - $8.99"));
        assert!(out.contains("[2] Pepperoni - $10.99"));
        assert!(out.contains("[3] Veggie - $9.49"));
    }

    #[test]
    fn test_render_badge() {
        assert_eq!(render_badge(0), "Order (0)");
        assert_eq!(render_badge(5), "Order (5)");
    }
}
