//! Cart commands run inside the provider scope.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;

use cartkeep::api::ApiClient;
use cartkeep::config::ApiConfig;
use cartkeep::{Cart, NewLineItem, Price, ProductId, use_cart};

/// Errors specific to cart commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Product {0} not found in catalog")]
    NotInCatalog(String),
    #[error("Product {0} is not in the cart")]
    NotInCart(String),
}

/// Product fields supplied on the command line.
#[derive(Debug, Default)]
pub struct ProductDetails {
    pub title: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<Decimal>,
}

impl ProductDetails {
    /// All fields given, no catalog lookup needed.
    fn complete(&self, id: &str) -> Option<NewLineItem> {
        Some(NewLineItem {
            id: ProductId::new(id),
            title: self.title.clone()?,
            image_url: self.image_url.clone()?,
            price: Price::new(self.price?),
        })
    }

    /// Fill missing fields from a catalog entry.
    fn merged_with(self, catalog: NewLineItem) -> NewLineItem {
        NewLineItem {
            id: catalog.id,
            title: self.title.unwrap_or(catalog.title),
            image_url: self.image_url.unwrap_or(catalog.image_url),
            price: self.price.map_or(catalog.price, Price::new),
        }
    }
}

/// Print the cart.
pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let cart = use_cart()?.snapshot().await;
    emit(&render_cart(&cart));
    Ok(())
}

/// Add a product to the cart.
///
/// Products already in the cart get one more unit. New products use the
/// command-line details, with gaps filled from the catalog API.
pub async fn add(
    id: &str,
    details: ProductDetails,
    api: &ApiConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = use_cart()?;
    let product_id = ProductId::new(id);

    // Products already in the cart carry their details, so no catalog fetch
    let known = store.snapshot().await.get(&product_id).cloned();

    let item = match (known, details.complete(id)) {
        (Some(existing), _) => NewLineItem::from(existing),
        (None, Some(item)) => item,
        (None, None) => {
            let catalog = ApiClient::new(api).list_products().await?;
            let entry = catalog
                .into_iter()
                .find(|product| product.id == product_id)
                .ok_or_else(|| CommandError::NotInCatalog(id.to_string()))?;
            details.merged_with(entry)
        }
    };

    store.add_to_cart(item).await;
    info!(product_id = %id, "Added product to cart");
    Ok(())
}

/// Increase a product's quantity.
pub async fn increment(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !use_cart()?.increment(&ProductId::new(id)).await {
        return Err(CommandError::NotInCart(id.to_string()).into());
    }
    Ok(())
}

/// Decrease a product's quantity, stopping at 1.
pub async fn decrement(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = use_cart()?;
    let product_id = ProductId::new(id);

    if !store.decrement(&product_id).await {
        let cart = store.snapshot().await;
        if cart.get(&product_id).is_none() {
            return Err(CommandError::NotInCart(id.to_string()).into());
        }
        info!(product_id = %id, "Quantity already at 1, unchanged");
    }
    Ok(())
}

/// Render the cart as a plain-text table.
fn render_cart(cart: &Cart) -> String {
    if cart.is_empty() {
        return "Cart is empty\n".to_string();
    }

    let mut out = String::new();
    for item in cart.products() {
        let _ = writeln!(
            out,
            "{:<12} {:<32} {:>4} x {:>10} = {:>10}",
            item.id,
            item.title,
            item.quantity,
            item.price.to_string(),
            item.line_price().to_string(),
        );
    }
    let _ = writeln!(
        out,
        "{} item(s), subtotal {}",
        cart.item_count(),
        cart.subtotal()
    );
    out
}

#[allow(clippy::print_stdout)]
fn emit(text: &str) {
    print!("{text}");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Arc;

    use cartkeep::CartProvider;
    use cartkeep::config::StorageConfig;
    use cartkeep::storage::MemoryStorage;

    use super::*;

    fn item(id: &str, cents: i64) -> NewLineItem {
        NewLineItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: "u".to_string(),
            price: Price::from_cents(cents),
        }
    }

    #[tokio::test]
    async fn test_add_existing_product_skips_catalog() {
        let provider =
            CartProvider::mount(Arc::new(MemoryStorage::new()), &StorageConfig::default()).await;
        // Nothing listens here, so any catalog fetch would fail the command
        let api = ApiConfig::new("http://127.0.0.1:0").unwrap();

        provider
            .scope(async {
                let full = ProductDetails {
                    title: Some("Chair".to_string()),
                    image_url: Some("u".to_string()),
                    price: Some(Decimal::from(5)),
                };
                add("p1", full, &api).await?;
                add("p1", ProductDetails::default(), &api).await?;
                Ok::<_, Box<dyn std::error::Error>>(())
            })
            .await
            .unwrap();

        let products = provider.store().products().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 2);
        assert_eq!(products[0].title, "Chair");
    }

    #[tokio::test]
    async fn test_add_unknown_product_without_details_needs_catalog() {
        let provider =
            CartProvider::mount(Arc::new(MemoryStorage::new()), &StorageConfig::default()).await;
        let api = ApiConfig::new("http://127.0.0.1:0").unwrap();

        let result = provider
            .scope(add("p1", ProductDetails::default(), &api))
            .await;

        assert!(result.is_err());
        assert!(provider.store().products().await.is_empty());
    }

    #[test]
    fn test_render_empty_cart() {
        assert_eq!(render_cart(&Cart::new()), "Cart is empty\n");
    }

    #[test]
    fn test_render_cart_totals() {
        let mut cart = Cart::new();
        cart.add(item("p1", 1000));
        cart.add(item("p1", 1000));
        cart.add(item("p2", 250));

        let text = render_cart(&cart);
        assert_eq!(text.lines().count(), 3);
        assert!(text.ends_with("3 item(s), subtotal $22.50\n"));
    }

    #[test]
    fn test_details_complete_requires_all_fields() {
        let partial = ProductDetails {
            title: Some("Chair".to_string()),
            ..ProductDetails::default()
        };
        assert!(partial.complete("p1").is_none());

        let full = ProductDetails {
            title: Some("Chair".to_string()),
            image_url: Some("u".to_string()),
            price: Some(Decimal::from(5)),
        };
        let product = full.complete("p1").unwrap();
        assert_eq!(product.price, Price::from_cents(500));
    }

    #[test]
    fn test_details_merge_prefers_command_line() {
        let details = ProductDetails {
            price: Some(Decimal::from(1)),
            ..ProductDetails::default()
        };
        let merged = details.merged_with(item("p1", 9900));

        assert_eq!(merged.title, "Product p1");
        assert_eq!(merged.price, Price::from_cents(100));
    }
}
