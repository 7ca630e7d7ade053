//! Order placement and the session checkout snapshot.

use chrono::{DateTime, Utc};
use rand::Rng;
use solestyle_core::checkout::ValidCheckout;
use solestyle_core::storage::keys;
use solestyle_core::{Cart, Order, OrderId, StorageError};
use thiserror::Error;
use tower_sessions::Session;

use super::VisitorStore;

/// How many order numbers to draw before giving up on a unique one.
pub const ORDER_ID_ATTEMPTS: usize = 10;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("no unused order number after {0} attempts")]
    OrderIdExhausted(usize),
}

/// Turn a checkout snapshot and a validated form into a stored order.
///
/// Appends the order to the visitor's history and resets their cart. The
/// session side ([`take_snapshot`], [`remember_order`]) is left to the caller.
///
/// # Errors
///
/// Returns an error if storage fails or no unused order number was found.
pub fn place_order<R: Rng + ?Sized>(
    store: &VisitorStore<'_>,
    snapshot: &Cart,
    checkout: ValidCheckout,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Order, PlaceOrderError> {
    let existing = store.load_orders()?;
    let order_id = OrderId::generate_unique(now, rng, ORDER_ID_ATTEMPTS, |candidate| {
        existing.iter().any(|order| &order.order_id == candidate)
    })
    .ok_or(PlaceOrderError::OrderIdExhausted(ORDER_ID_ATTEMPTS))?;

    let order = Order::new(order_id, now, snapshot, checkout);
    store.append_order(order.clone())?;
    store.reset_cart()?;

    tracing::info!(
        visitor = %store.visitor(),
        order_id = %order.order_id,
        total = %order.totals.total,
        payment = order.payment.method.as_str(),
        "Order placed"
    );

    Ok(order)
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Read the checkout snapshot. Unreadable snapshots count as missing.
pub async fn load_snapshot(session: &Session) -> Option<Cart> {
    session
        .get::<Cart>(keys::CHECKOUT_CART)
        .await
        .inspect_err(|e| tracing::warn!("Ignoring unreadable checkout snapshot: {e}"))
        .ok()
        .flatten()
}

/// Store a copy of the cart for the checkout page.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_snapshot(
    session: &Session,
    cart: &Cart,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CHECKOUT_CART, cart).await
}

/// Remove the checkout snapshot from the session and return it.
///
/// Called before the order is stored, so a repeated submit finds no
/// snapshot even if a later step fails.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn take_snapshot(
    session: &Session,
) -> Result<Option<Cart>, tower_sessions::session::Error> {
    session.remove::<Cart>(keys::CHECKOUT_CART).await
}

/// Remember a placed order's number for the confirmation page.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn remember_order(
    session: &Session,
    order_id: &OrderId,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::LAST_ORDER_ID, order_id).await
}

/// The number of the order placed last in this session.
pub async fn last_order_id(session: &Session) -> Option<OrderId> {
    session
        .get::<OrderId>(keys::LAST_ORDER_ID)
        .await
        .inspect_err(|e| tracing::warn!("Ignoring unreadable last order id: {e}"))
        .ok()
        .flatten()
}
