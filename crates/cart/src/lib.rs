//! Slice House Cart - cart state manager, persistence, and cross-tab sync.
//!
//! This crate is the stateful core of the ordering app. Each execution
//! context ("tab") constructs one [`CartManager`] over a shared
//! [`CartStore`] slot; mutations update the in-memory [`Cart`]
//! synchronously, write through to the store best-effort, and notify
//! subscribers. A manager attached to a [`StorageEvents`] source reconciles
//! wholesale (last write wins) when another context changes the slot.
//!
//! # Architecture
//!
//! - [`store`] - Persistent store adapter: the [`CartStore`] seam plus
//!   in-memory and file-backed implementations. Storage faults are
//!   swallowed here; callers only lose durability, never state.
//! - [`manager`] - The [`CartManager`]: load-on-construct, the cart
//!   operations, write-through persistence, and an explicit
//!   publish/subscribe list for re-renders.
//! - [`sync`] - The cross-tab sync protocol: [`StorageEvent`] notifications
//!   delivered through an injected [`StorageEvents`] capability so tests
//!   can drive a fake emitter.
//!
//! # Concurrency model
//!
//! Everything here is single-threaded and cooperative, matching a browser
//! tab: manager operations and event reconciliation run on one thread and
//! are mutually exclusive, so there is no internal locking. Handles are
//! `Rc`, not `Arc`, on purpose.
//!
//! [`Cart`]: slice_house_core::Cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod manager;
pub mod store;
pub mod sync;

pub use manager::{CartManager, SubscriptionId};
pub use store::{CartStore, FileStore, MemoryStore};
pub use sync::{ListenerId, StorageEvent, StorageEventBus, StorageEvents};
