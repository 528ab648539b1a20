//! The cart: an ordered list of line items, unique by product id.
//!
//! All mutation rules live here so the store only has to worry about
//! sequencing and persistence.

use serde::Serialize;
use thiserror::Error;

use crate::types::{LineItem, NewLineItem, Price, ProductId};

/// Errors decoding a persisted cart snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed cart snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// An ordered sequence of line items, unique by `id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from possibly untrusted items.
    ///
    /// Entries with quantity 0 are dropped. Repeated ids are merged into the
    /// first occurrence by summing quantities, so order of first appearance
    /// is kept.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = LineItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            if item.quantity == 0 {
                continue;
            }
            match cart.find_mut(&item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    /// Decode a snapshot produced by [`Cart::to_json`].
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` if the payload is not a JSON array
    /// of line items.
    pub fn from_json(payload: &str) -> Result<Self, SnapshotError> {
        let items: Vec<LineItem> = serde_json::from_str(payload)?;
        Ok(Self::from_items(items))
    }

    /// Encode the cart as a JSON array of line items.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization itself fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Add a product: bump its quantity if present, otherwise append it with
    /// quantity 1.
    pub fn add(&mut self, item: NewLineItem) {
        if !self.increment(&item.id) {
            self.items.push(LineItem::first(item));
        }
    }

    /// Increase the quantity of `id` by one. Returns whether `id` was found.
    pub fn increment(&mut self, id: &ProductId) -> bool {
        match self.find_mut(id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Decrease the quantity of `id` by one, never below 1.
    ///
    /// Returns whether the cart changed.
    pub fn decrement(&mut self, id: &ProductId) -> bool {
        match self.find_mut(id) {
            Some(item) if item.quantity > 1 => {
                item.quantity -= 1;
                true
            }
            _ => false,
        }
    }

    /// Line items in insertion order.
    #[must_use]
    pub fn products(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line item.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all line items.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(LineItem::line_price).sum()
    }

    fn find_mut(&mut self, id: &ProductId) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| &item.id == id)
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}
