//! Per-visitor persistent state.
//!
//! Wraps a [`Storage`] backend with the visitor's scope and knows how to
//! read and write the cart and the order history. Unreadable documents
//! degrade to empty values so a corrupted file never locks a visitor out
//! of the shop. The order history is never overwritten while unreadable:
//! the raw document is first copied to a backup key.

use solestyle_core::storage::{StorageExt, keys};
use solestyle_core::{Cart, Order, OrderId, ScopedStorage, Storage, StorageError};
use uuid::Uuid;

/// Prefix of the keys holding unreadable order lists set aside by
/// [`VisitorStore::append_order`].
pub const ORDERS_BACKUP_PREFIX: &str = "solestyleOrders-backup-";

/// Persistent storage of one visitor.
pub struct VisitorStore<'a> {
    storage: ScopedStorage<'a>,
}

impl<'a> VisitorStore<'a> {
    #[must_use]
    pub fn new(storage: &'a dyn Storage, visitor: &str) -> Self {
        Self {
            storage: ScopedStorage::new(storage, visitor),
        }
    }

    #[must_use]
    pub fn visitor(&self) -> &str {
        self.storage.scope()
    }

    /// Load the cart, or an empty one if none is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. A malformed document
    /// is logged and replaced by an empty cart.
    pub fn load_cart(&self) -> Result<Cart, StorageError> {
        match self.storage.get_json::<Cart>(keys::CART) {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            Err(StorageError::Malformed { source, .. }) => {
                tracing::warn!(visitor = %self.visitor(), "Discarding malformed cart: {source}");
                Ok(Cart::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Write the whole cart back.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn save_cart(&self, cart: &Cart) -> Result<(), StorageError> {
        self.storage.set_json(keys::CART, cart)
    }

    /// Replace the stored cart with an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    pub fn reset_cart(&self) -> Result<(), StorageError> {
        self.save_cart(&Cart::new())
    }

    /// Every order placed by the visitor, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read. A malformed document
    /// is logged and treated as an empty history.
    pub fn load_orders(&self) -> Result<Vec<Order>, StorageError> {
        match self.storage.get_json::<Vec<Order>>(keys::ORDERS) {
            Ok(orders) => Ok(orders.unwrap_or_default()),
            Err(StorageError::Malformed { source, .. }) => {
                tracing::warn!(
                    visitor = %self.visitor(),
                    "Discarding malformed order list: {source}"
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Append an order to the history.
    ///
    /// A malformed history is moved to a backup key before the new list is
    /// written, so earlier orders are kept for manual recovery.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read or written.
    pub fn append_order(&self, order: Order) -> Result<(), StorageError> {
        let mut orders = match self.storage.get_json::<Vec<Order>>(keys::ORDERS) {
            Ok(orders) => orders.unwrap_or_default(),
            Err(StorageError::Malformed { source, .. }) => {
                let backup = self.backup_orders()?;
                tracing::warn!(
                    visitor = %self.visitor(),
                    backup_key = %backup,
                    "Moved malformed order list aside: {source}"
                );
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        orders.push(order);
        self.storage.set_json(keys::ORDERS, &orders)
    }

    /// Copy the raw order list to a fresh backup key and return that key.
    fn backup_orders(&self) -> Result<String, StorageError> {
        let key = format!("{ORDERS_BACKUP_PREFIX}{}", Uuid::new_v4().simple());
        if let Some(raw) = self.storage.get_item(keys::ORDERS)? {
            self.storage.set_item(&key, &raw)?;
        }
        Ok(key)
    }

    /// Look up an order by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn find_order(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self
            .load_orders()?
            .into_iter()
            .find(|order| &order.order_id == order_id))
    }
}
