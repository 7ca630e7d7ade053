//! SoleStyle Core - Cart, checkout, and order types.
//!
//! This crate holds the shop's domain logic, shared by:
//! - `storefront` - The web shop (cart, checkout, confirmation pages)
//! - `cli` - Command-line tools for inspecting stored carts and orders
//!
//! # Architecture
//!
//! The core crate contains only types, pure state transitions, and traits -
//! no file access, no HTTP. Storage backends implement [`storage::Storage`]
//! elsewhere; everything here can be tested without a running server.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and payment statuses
//! - [`cart`] - The cart value and its operations
//! - [`checkout`] - Form validation, card helpers, and order records
//! - [`storage`] - Key/value storage trait, storage keys, in-memory backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod storage;
pub mod types;

pub use cart::{Cart, CartError, CartItem, LineKey, LineSelector, NewCartItem};
pub use checkout::{CheckoutForm, Order, OrderTotals};
pub use storage::{MemoryStorage, ScopedStorage, Storage, StorageError};
pub use types::*;
