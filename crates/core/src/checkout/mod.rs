//! Checkout: form validation, card helpers, and order creation.
//!
//! The checkout page works from a snapshot of the cart taken when the
//! customer pressed "Checkout", so later cart edits in another tab do not
//! change what is being paid for.

pub mod card;
pub mod form;
pub mod order;

pub use card::{format_card_number, is_valid_card_number, is_valid_cvv};
pub use form::{CheckoutForm, Field, FieldError, ValidCheckout, ValidationErrors};
pub use order::{CustomerInfo, Order, OrderTotals, Payment, ShippingAddress, TAX_RATE};
