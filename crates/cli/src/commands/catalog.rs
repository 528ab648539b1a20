//! Catalog commands.

use std::fmt::Write as _;

use tracing::info;

use cartkeep::NewLineItem;
use cartkeep::api::ApiClient;
use cartkeep::config::ApiConfig;

/// Print the products offered by the catalog API.
pub async fn list(config: &ApiConfig) -> Result<(), Box<dyn std::error::Error>> {
    let client = ApiClient::new(config);
    let products = client.list_products().await?;
    info!(count = products.len(), base_url = %client.base_url(), "Fetched catalog");

    let mut out = String::new();
    for product in &products {
        let _ = writeln!(out, "{}", render_product(product));
    }
    emit(&out);
    Ok(())
}

fn render_product(product: &NewLineItem) -> String {
    format!("{:<12} {:<32} {:>10}", product.id, product.title, product.price.to_string())
}

#[allow(clippy::print_stdout)]
fn emit(text: &str) {
    print!("{text}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartkeep::{Price, ProductId};

    #[test]
    fn test_render_product() {
        let product = NewLineItem {
            id: ProductId::new("p1"),
            title: "Chair".to_string(),
            image_url: "u".to_string(),
            price: Price::from_cents(20000),
        };
        let line = render_product(&product);
        assert!(line.starts_with("p1 "));
        assert!(line.contains("Chair"));
        assert!(line.ends_with("$200.00"));
    }
}
