//! Integration tests for Cartkeep.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cartkeep-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_persistence` - Carts surviving provider remounts on real files
//! - `cart_provider` - Scope boundary and shared-store behaviour
//!
//! Shared fixtures live here so each test file stays focused on behaviour.

use std::path::Path;
use std::sync::Arc;

use cartkeep::config::StorageConfig;
use cartkeep::storage::FileStorage;
use cartkeep::{CartProvider, NewLineItem, Price, ProductId};

/// A catalog product with a price in cents.
#[must_use]
pub fn product(id: &str, cents: i64) -> NewLineItem {
    NewLineItem {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        image_url: format!("https://img.example.com/{id}.png"),
        price: Price::from_cents(cents),
    }
}

/// Storage configuration rooted in `dir` with the default key.
#[must_use]
pub fn storage_config(dir: &Path) -> StorageConfig {
    StorageConfig {
        dir: dir.to_path_buf(),
        ..StorageConfig::default()
    }
}

/// Mount a provider over file storage in `dir`.
pub async fn mount_in(dir: &Path) -> CartProvider {
    let config = storage_config(dir);
    CartProvider::mount(Arc::new(FileStorage::new(&config.dir)), &config).await
}
