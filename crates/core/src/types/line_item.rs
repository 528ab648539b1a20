//! Cart line items.
//!
//! The persisted field names follow the catalog API (`image_url`), while
//! `imageUrl` is accepted on input for payloads written by camel-cased
//! clients.

use serde::{Deserialize, Serialize};

use super::{Price, ProductId};

/// A product as offered for adding to the cart (no quantity yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLineItem {
    pub id: ProductId,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: Price,
}

/// One product entry in the cart with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: ProductId,
    pub title: String,
    #[serde(alias = "imageUrl")]
    pub image_url: String,
    pub price: Price,
    /// Always >= 1 while the item is in a cart.
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item with quantity 1 from a catalog product.
    #[must_use]
    pub fn first(item: NewLineItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
            quantity: 1,
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// Drops the quantity, e.g. to add another unit of a product already in a cart.
impl From<LineItem> for NewLineItem {
    fn from(item: LineItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            image_url: item.image_url,
            price: item.price,
        }
    }
}

impl From<NewLineItem> for LineItem {
    fn from(item: NewLineItem) -> Self {
        Self::first(item)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_item_accepts_camel_case_image_url() {
        let json = r#"{"id":"p1","title":"T","imageUrl":"u","price":10,"quantity":2}"#;
        let item: LineItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.image_url, "u");
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_line_item_serializes_snake_case_image_url() {
        let item = LineItem::first(NewLineItem {
            id: ProductId::new("p1"),
            title: "T".to_string(),
            image_url: "u".to_string(),
            price: Price::from_cents(1000),
        });
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["image_url"], "u");
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_line_price() {
        let mut item = LineItem::first(NewLineItem {
            id: ProductId::new("p1"),
            title: "T".to_string(),
            image_url: "u".to_string(),
            price: Price::from_cents(250),
        });
        item.quantity = 3;
        assert_eq!(item.line_price(), Price::from_cents(750));
    }
}
