//! Slice House Core - Shared domain types.
//!
//! This crate provides the types shared by the Slice House components:
//! - `cart` - Cart state manager, persistence, and cross-tab sync
//! - `storefront` - Terminal front end and presentation glue
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access, no
//! subscriptions. The [`types::Cart`] aggregate holds the pure cart
//! semantics (merge-on-add, quantity clamping, derived totals); everything
//! stateful lives in the `cart` crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids and prices, plus the product
//!   descriptor and cart aggregate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
