//! Shopping cart state.
//!
//! A [`Cart`] is a plain value: handlers load it from storage, apply one of
//! the operations below, and write it back. Item count and subtotal are
//! always derived from the lines, never stored alongside them.
//!
//! Lines are keyed by [`LineKey`] (product, color, size). Adding the same key
//! twice bumps the quantity of the existing line; a different color or size
//! opens a new line.

use serde::{Deserialize, Serialize};

use crate::types::{Price, ProductId};

/// Highest quantity offered by the cart page quantity selector.
pub const MAX_SELECTABLE_QUANTITY: u32 = 5;

/// Largest quantity one line can hold.
pub const MAX_LINE_QUANTITY: u32 = 999;

/// Errors raised by cart mutations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// Line quantities must be within `1..=MAX_LINE_QUANTITY`.
    #[error("quantity must be between 1 and 999 (got {0})")]
    InvalidQuantity(u32),
}

/// Identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    pub product_id: ProductId,
    pub color: Option<String>,
    pub size: Option<String>,
}

impl LineKey {
    /// Build a key, treating blank color/size as "no selection".
    #[must_use]
    pub fn new(product_id: ProductId, color: Option<String>, size: Option<String>) -> Self {
        Self {
            product_id,
            color: normalize_variant(color),
            size: normalize_variant(size),
        }
    }
}

/// Which line(s) an edit applies to.
#[derive(Debug, Clone, Copy)]
pub enum LineSelector<'a> {
    /// First line for this product, whatever its color or size.
    Product(&'a ProductId),
    /// The line with exactly this key.
    Line(&'a LineKey),
}

impl LineSelector<'_> {
    fn matches(&self, item: &CartItem) -> bool {
        match self {
            Self::Product(id) => item.product_id == **id,
            Self::Line(key) => {
                item.product_id == key.product_id
                    && item.color == key.color
                    && item.size == key.size
            }
        }
    }
}

/// One line of the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub quantity: u32,
}

impl CartItem {
    /// The line's identity.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey {
            product_id: self.product_id.clone(),
            color: self.color.clone(),
            size: self.size.clone(),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// A product selection to put in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub color: Option<String>,
    pub size: Option<String>,
}

/// The shopping cart.
///
/// Serializes as `{"items": [...], "totalItems": n, "subtotal": "x.yy"}`.
/// When deserializing, stored totals are ignored and lines with a zero
/// quantity are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "StoredCart")]
pub struct Cart {
    items: Vec<CartItem>,
}

#[derive(Deserialize)]
struct StoredCart {
    #[serde(default)]
    items: Vec<CartItem>,
}

impl From<StoredCart> for Cart {
    fn from(stored: StoredCart) -> Self {
        Self {
            items: stored
                .items
                .into_iter()
                .filter(|item| item.quantity > 0)
                .map(|mut item| {
                    item.quantity = item.quantity.min(MAX_LINE_QUANTITY);
                    item
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoredCartRef<'a> {
    items: &'a [CartItem],
    total_items: u32,
    subtotal: Price,
}

impl Serialize for Cart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        StoredCartRef {
            items: &self.items,
            total_items: self.total_items(),
            subtotal: self.subtotal(),
        }
        .serialize(serializer)
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line quantities.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// First line matching `selector`.
    #[must_use]
    pub fn find(&self, selector: LineSelector<'_>) -> Option<&CartItem> {
        self.items.iter().find(|item| selector.matches(item))
    }

    /// Add one unit of a product selection.
    ///
    /// Bumps the quantity of the line with the same key (capped at
    /// [`MAX_LINE_QUANTITY`]), or appends a new line with quantity 1.
    /// Returns the affected line's new quantity.
    pub fn add(&mut self, new: NewCartItem) -> u32 {
        let key = LineKey::new(new.product_id, new.color, new.size);
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| LineSelector::Line(&key).matches(item))
        {
            item.quantity = item.quantity.saturating_add(1).min(MAX_LINE_QUANTITY);
            return item.quantity;
        }
        self.items.push(CartItem {
            product_id: key.product_id,
            name: new.name,
            price: new.price,
            image: new.image,
            color: key.color,
            size: key.size,
            quantity: 1,
        });
        1
    }

    /// Remove the first line matching `selector`.
    ///
    /// Returns the removed line, or `None` if nothing matched.
    pub fn remove(&mut self, selector: LineSelector<'_>) -> Option<CartItem> {
        let index = self.items.iter().position(|item| selector.matches(item))?;
        Some(self.items.remove(index))
    }

    /// Set the quantity of the first line matching `selector`.
    ///
    /// Returns the change in quantity, or `None` if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity or one above
    /// [`MAX_LINE_QUANTITY`].
    pub fn set_quantity(
        &mut self,
        selector: LineSelector<'_>,
        quantity: u32,
    ) -> Result<Option<i64>, CartError> {
        if !(1..=MAX_LINE_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity(quantity));
        }
        let Some(item) = self.items.iter_mut().find(|item| selector.matches(item)) else {
            return Ok(None);
        };
        let delta = i64::from(quantity) - i64::from(item.quantity);
        item.quantity = quantity;
        Ok(Some(delta))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Parse a stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error if `json` is not a cart document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Encode the cart for storage.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

fn normalize_variant(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
