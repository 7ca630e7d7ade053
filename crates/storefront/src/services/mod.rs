//! Business logic services for storefront.
//!
//! # Services
//!
//! - `store` - Per-visitor persistent cart and order history
//! - `checkout` - Order placement and the session checkout snapshot

pub mod checkout;
pub mod store;

pub use store::VisitorStore;
