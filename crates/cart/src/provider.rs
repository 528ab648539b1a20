//! Scoped access to one shared cart store.
//!
//! A [`CartProvider`] owns the store for a subtree of async code. Code run
//! through [`CartProvider::scope`] can fetch the store with [`use_cart`]
//! instead of threading a handle through every call. Outside any scope,
//! [`use_cart`] fails with [`CartError::OutsideProvider`].
//!
//! Scopes are task-local: a task started with `tokio::spawn` does not
//! inherit its parent's scope and must be wrapped in `provider.scope(..)`
//! itself, or be handed a [`CartStore`] clone directly.

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::config::StorageConfig;
use crate::error::{CartError, Result};
use crate::storage::CartStorage;
use crate::store::CartStore;

tokio::task_local! {
    static CURRENT_CART: CartStore;
}

/// Owner of the cart store exposed to a scope.
#[derive(Debug, Clone)]
pub struct CartProvider {
    store: CartStore,
}

impl CartProvider {
    /// Mount a provider: create the store and start restoring the stored cart.
    ///
    /// Returns once rehydration has been started. Reads and mutations made
    /// through the store wait for it to complete.
    pub async fn mount(storage: Arc<dyn CartStorage>, config: &StorageConfig) -> Self {
        let store = CartStore::new(storage, config.key.clone());
        // Detached: the store's lock orders everything after the load.
        let _rehydration = store.start_initialize().await;
        info!(key = %config.key, "Cart provider mounted");
        Self { store }
    }

    /// The provider's store.
    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    /// Run `future` with this provider's store available through [`use_cart`].
    pub async fn scope<F: Future>(&self, future: F) -> F::Output {
        CURRENT_CART.scope(self.store.clone(), future).await
    }
}

/// Fetch the store of the enclosing provider scope.
///
/// # Errors
///
/// Returns `CartError::OutsideProvider` when called outside
/// [`CartProvider::scope`].
pub fn use_cart() -> Result<CartStore> {
    CURRENT_CART
        .try_with(CartStore::clone)
        .map_err(|_| CartError::OutsideProvider)
}
