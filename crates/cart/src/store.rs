//! The shared cart store.
//!
//! # Ordering
//!
//! Every mutation takes the cart mutex, applies the change, and queues a
//! serialized snapshot while still holding the lock. Snapshots therefore
//! enter the writer queue in the same order the mutations were applied. A
//! single background task drains that queue and only ever writes the newest
//! snapshot it has seen, so the stored cart always converges to the
//! in-memory cart and two quick mutations cannot overwrite each other.
//!
//! Persistence is fire-and-forget: mutators return as soon as the snapshot
//! is queued, and storage failures are logged and dropped.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, OwnedMutexGuard, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use cartkeep_core::{Cart, LineItem, NewLineItem, Price, ProductId};

use crate::storage::CartStorage;

/// Handle to one shared cart.
///
/// Cheaply cloneable; every clone refers to the same cart. Use
/// [`CartStore::same_store`] to check identity.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Arc<Mutex<CartState>>,
    storage: Arc<dyn CartStorage>,
    key: String,
    writer: mpsc::UnboundedSender<WriterCommand>,
    initialized: AtomicBool,
}

struct CartState {
    cart: Cart,
    /// Bumped on every mutation; tags queued snapshots.
    version: u64,
}

struct Snapshot {
    version: u64,
    payload: String,
}

enum WriterCommand {
    Write(Snapshot),
    Flush(oneshot::Sender<()>),
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.inner.key)
            .field("initialized", &self.inner.initialized.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create an empty store persisting under `key`.
    ///
    /// Spawns the background writer task, so this must be called from within
    /// a Tokio runtime. The writer stops once every handle is dropped.
    #[must_use]
    pub fn new(storage: Arc<dyn CartStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (writer, queue) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(Arc::clone(&storage), key.clone(), queue));

        Self {
            inner: Arc::new(StoreInner {
                state: Arc::new(Mutex::new(CartState {
                    cart: Cart::new(),
                    version: 0,
                })),
                storage,
                key,
                writer,
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Rehydrate the cart from storage and wait for it to finish.
    ///
    /// Only the first call (or the first [`CartStore::start_initialize`])
    /// does anything. A missing snapshot, a read failure or a malformed
    /// payload all leave the cart empty.
    pub async fn initialize(&self) {
        if let Some(handle) = self.start_initialize().await
            && let Err(e) = handle.await
        {
            warn!(error = %e, "Cart rehydration task failed");
        }
    }

    /// Begin rehydration in the background.
    ///
    /// The cart lock is taken before this returns, so any mutation or read
    /// issued afterwards waits for the stored cart to be loaded first.
    /// Returns `None` if the store was already initialized.
    pub async fn start_initialize(&self) -> Option<JoinHandle<()>> {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("Cart already initialized, skipping rehydration");
            return None;
        }

        let guard = Arc::clone(&self.inner.state).lock_owned().await;
        let storage = Arc::clone(&self.inner.storage);
        let key = self.inner.key.clone();
        Some(tokio::spawn(rehydrate(storage, key, guard)))
    }

    /// Add a product, bumping its quantity if it is already in the cart.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub async fn add_to_cart(&self, item: NewLineItem) {
        self.mutate(|cart| cart.add(item)).await;
    }

    /// Increase the quantity of `id` by one.
    ///
    /// Returns whether the product was in the cart. The cart is persisted
    /// either way.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn increment(&self, id: &ProductId) -> bool {
        self.mutate(|cart| cart.increment(id)).await
    }

    /// Decrease the quantity of `id` by one, never below 1.
    ///
    /// Returns whether the quantity changed.
    #[instrument(skip(self, id), fields(product_id = %id))]
    pub async fn decrement(&self, id: &ProductId) -> bool {
        self.mutate(|cart| cart.decrement(id)).await
    }

    /// Current line items in cart order.
    pub async fn products(&self) -> Vec<LineItem> {
        self.inner.state.lock().await.cart.products().to_vec()
    }

    /// Copy of the whole cart.
    pub async fn snapshot(&self) -> Cart {
        self.inner.state.lock().await.cart.clone()
    }

    /// Total units in the cart.
    pub async fn item_count(&self) -> u32 {
        self.inner.state.lock().await.cart.item_count()
    }

    /// Sum of line prices.
    pub async fn subtotal(&self) -> Price {
        self.inner.state.lock().await.cart.subtotal()
    }

    /// Wait until every snapshot queued so far has been handed to storage.
    ///
    /// Storage errors are still swallowed; this only guarantees the writes
    /// were attempted.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.inner.writer.send(WriterCommand::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }

    /// Key the cart is stored under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.inner.key
    }

    /// Whether both handles refer to the same underlying store.
    #[must_use]
    pub fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Apply `op` under the cart lock and queue the resulting snapshot.
    async fn mutate<R>(&self, op: impl FnOnce(&mut Cart) -> R) -> R {
        let mut state = self.inner.state.lock().await;
        let result = op(&mut state.cart);
        state.version += 1;

        debug!(
            version = state.version,
            items = state.cart.len(),
            "Cart mutated"
        );
        self.queue_snapshot(&state);
        result
    }

    fn queue_snapshot(&self, state: &CartState) {
        let payload = match state.cart.to_json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Failed to serialize cart, skipping persist");
                return;
            }
        };

        let snapshot = Snapshot {
            version: state.version,
            payload,
        };
        if self
            .inner
            .writer
            .send(WriterCommand::Write(snapshot))
            .is_err()
        {
            warn!("Cart writer stopped, skipping persist");
        }
    }
}

/// Load the stored cart into the locked state.
async fn rehydrate(
    storage: Arc<dyn CartStorage>,
    key: String,
    mut state: OwnedMutexGuard<CartState>,
) {
    match storage.get(&key).await {
        Ok(Some(payload)) => match Cart::from_json(&payload) {
            Ok(cart) => {
                info!(key = %key, items = cart.len(), "Restored cart from storage");
                state.cart = cart;
            }
            Err(e) => warn!(key = %key, error = %e, "Ignoring unreadable stored cart"),
        },
        Ok(None) => debug!(key = %key, "No stored cart"),
        Err(e) => warn!(key = %key, error = %e, "Failed to read stored cart"),
    }
}

/// Single writer: persists snapshots in queue order, collapsing bursts to
/// the newest one.
async fn run_writer(
    storage: Arc<dyn CartStorage>,
    key: String,
    mut queue: mpsc::UnboundedReceiver<WriterCommand>,
) {
    while let Some(command) = queue.recv().await {
        let mut latest = None;
        let mut flushes = Vec::new();

        let mut next = Some(command);
        while let Some(command) = next {
            match command {
                WriterCommand::Write(snapshot) => latest = Some(snapshot),
                WriterCommand::Flush(done) => flushes.push(done),
            }
            next = queue.try_recv().ok();
        }

        if let Some(snapshot) = latest {
            match storage.set(&key, &snapshot.payload).await {
                Ok(()) => debug!(key = %key, version = snapshot.version, "Persisted cart"),
                Err(e) => warn!(
                    key = %key,
                    version = snapshot.version,
                    error = %e,
                    "Failed to persist cart"
                ),
            }
        }

        for done in flushes {
            let _ = done.send(());
        }
    }
    debug!(key = %key, "Cart writer stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn product(id: &str, cents: i64) -> NewLineItem {
        NewLineItem {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            image_url: format!("https://img.example.com/{id}.png"),
            price: Price::from_cents(cents),
        }
    }

    async fn stored_cart(storage: &MemoryStorage) -> Cart {
        let payload = storage.get("cart").await.unwrap().unwrap();
        Cart::from_json(&payload).unwrap()
    }

    #[tokio::test]
    async fn test_add_to_cart_persists() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::new(storage.clone(), "cart");

        store.add_to_cart(product("p1", 1000)).await;
        store.flush().await;

        let products = store.products().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 1);
        assert_eq!(stored_cart(&storage).await, store.snapshot().await);
    }

    #[tokio::test]
    async fn test_increment_and_decrement() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::new(storage.clone(), "cart");
        let id = ProductId::new("p1");

        store.add_to_cart(product("p1", 1000)).await;
        assert!(store.increment(&id).await);
        assert!(store.increment(&id).await);
        assert!(store.decrement(&id).await);

        assert_eq!(store.products().await[0].quantity, 2);
        assert!(!store.increment(&ProductId::new("missing")).await);
        assert_eq!(store.products().await.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_mutations_all_reach_storage() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::new(storage.clone(), "cart");

        let a = store.clone();
        let b = store.clone();
        tokio::join!(
            a.add_to_cart(product("a", 100)),
            b.add_to_cart(product("b", 200))
        );
        store.flush().await;

        let stored = stored_cart(&storage).await;
        assert_eq!(stored.len(), 2);
        assert_eq!(stored, store.snapshot().await);
    }

    #[tokio::test]
    async fn test_many_spawned_mutations_converge() {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::new(storage.clone(), "cart");
        store.add_to_cart(product("p1", 100)).await;

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment(&ProductId::new("p1")).await })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }
        store.flush().await;

        let stored = stored_cart(&storage).await;
        assert_eq!(stored.products()[0].quantity, 51);
        assert!(storage.write_count() <= 51);
    }

    #[tokio::test]
    async fn test_initialize_restores_stored_cart() {
        let payload = r#"[{"id":"p1","title":"T","image_url":"u","price":10,"quantity":3}]"#;
        let storage = Arc::new(MemoryStorage::with_entry("cart", payload));
        let store = CartStore::new(storage, "cart");

        store.initialize().await;

        let products = store.products().await;
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity, 3);
        assert_eq!(store.subtotal().await, Price::from_cents(3000));
    }

    #[tokio::test]
    async fn test_initialize_runs_once() {
        let payload = r#"[{"id":"p1","title":"T","image_url":"u","price":10,"quantity":1}]"#;
        let storage = Arc::new(MemoryStorage::with_entry("cart", payload));
        let store = CartStore::new(storage, "cart");

        store.initialize().await;
        store.increment(&ProductId::new("p1")).await;
        store.initialize().await;

        assert_eq!(store.products().await[0].quantity, 2);
        assert!(store.start_initialize().await.is_none());
    }

    #[tokio::test]
    async fn test_initialize_with_malformed_payload_leaves_cart_empty() {
        let storage = Arc::new(MemoryStorage::with_entry("cart", "{not json"));
        let store = CartStore::new(storage, "cart");

        store.initialize().await;
        assert!(store.products().await.is_empty());
    }

    #[tokio::test]
    async fn test_initialize_with_read_failure_leaves_cart_empty() {
        let storage = Arc::new(MemoryStorage::with_entry("cart", "[]"));
        storage.set_failing(true);
        let store = CartStore::new(storage, "cart");

        store.initialize().await;
        assert!(store.products().await.is_empty());
    }

    #[tokio::test]
    async fn test_mutation_waits_for_rehydration() {
        let payload = r#"[{"id":"p1","title":"T","image_url":"u","price":10,"quantity":1}]"#;
        let storage = Arc::new(MemoryStorage::with_entry("cart", payload));
        let store = CartStore::new(storage.clone(), "cart");

        let _pending = store.start_initialize().await;
        store.add_to_cart(product("p1", 1000)).await;
        store.flush().await;

        assert_eq!(store.products().await[0].quantity, 2);
        assert_eq!(stored_cart(&storage).await.products()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_write_failures_are_swallowed() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_failing(true);
        let store = CartStore::new(storage.clone(), "cart");

        store.add_to_cart(product("p1", 1000)).await;
        store.flush().await;

        assert_eq!(store.item_count().await, 1);
        assert_eq!(storage.write_count(), 0);

        storage.set_failing(false);
        store.increment(&ProductId::new("p1")).await;
        store.flush().await;
        assert_eq!(stored_cart(&storage).await.item_count(), 2);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = CartStore::new(Arc::new(MemoryStorage::new()), "cart");
        let other = store.clone();
        let unrelated = CartStore::new(Arc::new(MemoryStorage::new()), "cart");

        other.add_to_cart(product("p1", 100)).await;

        assert!(store.same_store(&other));
        assert!(!store.same_store(&unrelated));
        assert_eq!(store.products().await.len(), 1);
    }
}
