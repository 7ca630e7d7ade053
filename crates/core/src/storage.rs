//! Key/value storage for carts and orders.
//!
//! The shop keeps two kinds of state per visitor:
//!
//! - persistent: the cart and the order history, kept in a [`Storage`]
//!   backend under the visitor's scope (see [`ScopedStorage`])
//! - per browser session: the checkout snapshot and the last order number
//!
//! Values are JSON strings so stored documents keep the same shape whatever
//! backend holds them.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Storage key names.
pub mod keys {
    /// Persistent: the visitor's cart.
    pub const CART: &str = "solestyleCart";
    /// Persistent: every order the visitor placed, oldest first.
    pub const ORDERS: &str = "solestyleOrders";
    /// Session: cart snapshot taken when checkout started.
    pub const CHECKOUT_CART: &str = "checkoutCart";
    /// Session: order number shown on the confirmation page.
    pub const LAST_ORDER_ID: &str = "lastOrderId";
}

/// Separator between a scope and a key.
pub const SCOPE_SEPARATOR: char = '/';

/// Errors raised by storage backends.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing medium failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be stored by this backend.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    Poisoned,

    /// A value could not be encoded.
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A stored value is not the expected document.
    #[error("malformed value under {key}: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key/value store.
///
/// Operations are synchronous and each one is atomic on its own; a
/// read-modify-write sequence is not. Two requests racing on the same key
/// resolve as last writer wins.
pub trait Storage: Send + Sync {
    /// Read the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// JSON helpers available on every [`Storage`].
pub trait StorageExt: Storage {
    /// Read and decode the JSON document under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Malformed`] if the stored value does not
    /// decode as `T`, or any backend error.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        self.get_item(key)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|source| StorageError::Malformed {
                    key: key.to_owned(),
                    source,
                })
            })
            .transpose()
    }

    /// Encode `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the backend write fails.
    fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
            key: key.to_owned(),
            source,
        })?;
        self.set_item(key, &raw)
    }
}

impl<S: Storage + ?Sized> StorageExt for S {}

/// In-process storage. Contents are lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All keys currently stored, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Poisoned`] if the lock was poisoned.
    pub fn keys(&self) -> Result<Vec<String>, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned)?;
        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let items = self.items.read().map_err(|_| StorageError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.write().map_err(|_| StorageError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// A view of a [`Storage`] that prefixes every key with a scope.
///
/// Used to give each visitor a private namespace in a shared backend:
/// `cart` under scope `abc` is stored as `abc/cart`.
pub struct ScopedStorage<'a> {
    inner: &'a dyn Storage,
    scope: String,
}

impl<'a> ScopedStorage<'a> {
    #[must_use]
    pub fn new(inner: &'a dyn Storage, scope: impl Into<String>) -> Self {
        Self {
            inner,
            scope: scope.into(),
        }
    }

    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn scoped_key(&self, key: &str) -> Result<String, StorageError> {
        if self.scope.is_empty() || self.scope.contains(SCOPE_SEPARATOR) {
            return Err(StorageError::InvalidKey(self.scope.clone()));
        }
        Ok(format!("{}{SCOPE_SEPARATOR}{key}", self.scope))
    }
}

impl Storage for ScopedStorage<'_> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(&self.scoped_key(key)?)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(&self.scoped_key(key)?, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(&self.scoped_key(key)?)
    }
}
