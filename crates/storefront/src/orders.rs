//! Order placement.
//!
//! Placement is a local-only confirmation: there is no backend submission
//! and no order history. The one user-facing validation in the system lives
//! here - an empty cart cannot be ordered, and the rejection must be shown
//! to the user rather than silently swallowed.

use slice_house_cart::CartManager;
use slice_house_core::Price;
use thiserror::Error;

/// User-visible order placement failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// Placement attempted with nothing in the cart. Expected-path
    /// validation, not a system fault.
    #[error("Your cart is empty")]
    EmptyCart,
}

/// What the user is told after a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub total: Price,
    pub item_count: u32,
}

/// Place an order for the manager's current cart.
///
/// On success the cart is cleared (and the cleared state persisted); the
/// returned confirmation carries the charged total and unit count.
///
/// # Errors
///
/// Returns [`OrderError::EmptyCart`] without touching any state when the
/// cart has no items.
pub fn place_order(manager: &CartManager) -> Result<OrderConfirmation, OrderError> {
    if manager.is_empty() {
        return Err(OrderError::EmptyCart);
    }

    let confirmation = OrderConfirmation {
        total: manager.total(),
        item_count: manager.item_count(),
    };

    tracing::info!(
        total = %confirmation.total,
        items = confirmation.item_count,
        "order placed"
    );
    manager.clear();

    Ok(confirmation)
}
