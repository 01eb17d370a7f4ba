//! # Cart Store
//!
//! The single owner of the shopper's cart.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One Cart Operation                               │
//! │                                                                         │
//! │  snapshot ──► (cart, revision)                                          │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  plan     ──► stock check, catalog lookup, cart rules                   │
//! │     │         (may suspend on the network)                              │
//! │     ▼                                                                   │
//! │  commit   ──► under the commit lock:                                    │
//! │     │           revision still equal?  no ──► re-plan from a fresh      │
//! │     │                                          snapshot (bounded)       │
//! │     │           yes ──► write storage                                   │
//! │     │                   publish cart to subscribers                     │
//! │     │                   revision += 1                                   │
//! │     ▼                                                                   │
//! │  failure? ──► CartError ──► one NoticeKind to the NotificationSink      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A plan never sees a cart another commit has already replaced, so two
//! overlapping adds of the same product both land. Storage is written before
//! the in-memory cart changes; if the write fails nothing is published.
//!
//! ## Two Call Styles
//! - `add_product`, `remove_product`, `update_product_amount` notify and
//!   return `()`, the way the storefront UI calls them.
//! - `try_add_product`, `try_remove_product`, `try_update_product_amount`
//!   return the typed [`CartError`] and notify nobody.

use rocket_core::validation::{ensure_within_stock, validate_amount};
use rocket_core::{
    Cart, CartTotals, CoreError, LineItem, ProductId, UpdateProductAmount, DEFAULT_STORAGE_KEY,
};
use rocket_db::{load_cart, save_cart, DbError, KeyValueStore};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, warn};

use crate::config::{CartConfig, CorruptStatePolicy};
use crate::error::{CartError, CartResult, Operation};
use crate::notify::NotificationSink;
use crate::services::{ProductCatalog, StockService};

// =============================================================================
// Options & Backends
// =============================================================================

/// Tunables for a [`CartStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartStoreOptions {
    /// Key the cart snapshot lives under.
    pub storage_key: String,

    /// What `open` does with a snapshot that does not parse.
    pub on_corrupt: CorruptStatePolicy,

    /// Re-plans allowed after losing a commit race.
    pub max_conflict_retries: u32,
}

impl Default for CartStoreOptions {
    fn default() -> Self {
        CartStoreOptions {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            on_corrupt: CorruptStatePolicy::default(),
            max_conflict_retries: 3,
        }
    }
}

impl From<&CartConfig> for CartStoreOptions {
    fn from(config: &CartConfig) -> Self {
        CartStoreOptions {
            storage_key: config.storage.key.clone(),
            on_corrupt: config.store.on_corrupt,
            max_conflict_retries: config.store.max_conflict_retries,
        }
    }
}

/// The collaborators a store talks to.
#[derive(Clone)]
pub struct CartBackends {
    pub storage: Arc<dyn KeyValueStore>,
    pub stock: Arc<dyn StockService>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub notifier: Arc<dyn NotificationSink>,
}

// =============================================================================
// Cart Store
// =============================================================================

/// Stock-validated, persisted shopping cart.
///
/// Share it between tasks with `Arc<CartStore>`; every method takes `&self`.
pub struct CartStore {
    backends: CartBackends,
    options: CartStoreOptions,

    /// Latest committed cart. Receivers are handed out by `subscribe`.
    state: watch::Sender<Cart>,

    /// Commit lock. The value is the revision of the cart in `state`.
    revision: Mutex<u64>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("options", &self.options)
            .field("items", &self.state.borrow().len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Opens the store, reading the persisted cart once.
    ///
    /// A missing snapshot opens an empty cart. A corrupt one is handled per
    /// `options.on_corrupt`.
    pub async fn open(backends: CartBackends, options: CartStoreOptions) -> CartResult<Self> {
        let key = options.storage_key.as_str();

        let cart = match load_cart(backends.storage.as_ref(), key).await {
            Ok(Some(cart)) => cart,
            Ok(None) => Cart::new(),
            Err(DbError::CorruptSnapshot { key, reason }) => match options.on_corrupt {
                CorruptStatePolicy::Reset => {
                    warn!(key = %key, reason = %reason, "Discarding corrupt persisted cart");
                    Cart::new()
                }
                CorruptStatePolicy::Fail => return Err(CartError::CorruptState { key, reason }),
            },
            Err(e) => return Err(e.into()),
        };

        info!(key = %key, items = cart.len(), "Cart store opened");

        let (state, _) = watch::channel(cart);
        Ok(CartStore {
            backends,
            options,
            state,
            revision: Mutex::new(0),
        })
    }

    // =========================================================================
    // Read Access
    // =========================================================================

    /// Current cart snapshot.
    pub fn cart(&self) -> Cart {
        self.state.borrow().clone()
    }

    /// Change feed: the receiver sees the latest cart after every commit.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.state.subscribe()
    }

    pub fn totals(&self) -> CartTotals {
        self.state.borrow().totals()
    }

    /// Number of commits since the store was opened.
    pub async fn revision(&self) -> u64 {
        *self.revision.lock().await
    }

    pub fn options(&self) -> &CartStoreOptions {
        &self.options
    }

    // =========================================================================
    // Notifying Operations
    // =========================================================================

    /// Adds one unit of a product, notifying the shopper on failure.
    pub async fn add_product(&self, product_id: ProductId) {
        if let Err(e) = self.try_add_product(product_id).await {
            self.report(Operation::Add, product_id, &e);
        }
    }

    /// Removes a product's line item, notifying the shopper on failure.
    pub async fn remove_product(&self, product_id: ProductId) {
        if let Err(e) = self.try_remove_product(product_id).await {
            self.report(Operation::Remove, product_id, &e);
        }
    }

    /// Sets a product's amount, notifying the shopper on failure.
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        if let Err(e) = self.try_update_product_amount(request).await {
            self.report(Operation::Update, request.product_id, &e);
        }
    }

    // =========================================================================
    // Typed Operations
    // =========================================================================

    /// Adds one unit of a product.
    ///
    /// ## Errors
    /// - `Rule(StockExceeded)` if current amount + 1 is more than stock
    /// - `Service` if the stock or catalog lookup fails
    /// - `Storage` if the snapshot write fails
    /// - `Conflict` if concurrent commits exhaust the re-plans
    pub async fn try_add_product(&self, product_id: ProductId) -> CartResult<()> {
        debug!(product_id = %product_id, "add_product");
        self.run(Operation::Add, |cart| self.plan_add(cart, product_id))
            .await
    }

    /// Removes a product's line item. No remote call is made.
    ///
    /// ## Errors
    /// - `Rule(ProductNotInCart)` if the product has no line item
    /// - `Storage` if the snapshot write fails
    pub async fn try_remove_product(&self, product_id: ProductId) -> CartResult<()> {
        debug!(product_id = %product_id, "remove_product");
        self.run(Operation::Remove, |cart| async move {
            cart.without(product_id).map(Some).map_err(CartError::from)
        })
        .await
    }

    /// Sets a product's amount.
    ///
    /// A product that is not in the cart is left out: the call succeeds and
    /// nothing is written.
    ///
    /// ## Errors
    /// - `Rule(Validation)` if the amount is below 1 (checked before any
    ///   remote call)
    /// - `Rule(StockExceeded)` if the amount is more than stock
    /// - `Service`, `Storage`, `Conflict` as for add
    pub async fn try_update_product_amount(&self, request: UpdateProductAmount) -> CartResult<()> {
        debug!(
            product_id = %request.product_id,
            amount = request.amount,
            "update_product_amount"
        );
        self.run(Operation::Update, |cart| self.plan_update(cart, request))
            .await
    }

    // =========================================================================
    // Planning
    // =========================================================================

    async fn plan_add(&self, cart: Cart, product_id: ProductId) -> CartResult<Option<Cart>> {
        let requested = cart.next_amount(product_id)?;

        let stock = self.backends.stock.stock(product_id).await?;
        ensure_within_stock(&stock, requested)?;

        let next = if cart.contains(product_id) {
            cart.with_incremented(product_id)?
        } else {
            let product = self.backends.catalog.product(product_id).await?;
            cart.with_appended(LineItem::from_product(&product))?
        };

        Ok(Some(next))
    }

    async fn plan_update(&self, cart: Cart, request: UpdateProductAmount) -> CartResult<Option<Cart>> {
        let UpdateProductAmount { product_id, amount } = request;
        validate_amount(amount).map_err(CoreError::from)?;

        let stock = self.backends.stock.stock(product_id).await?;
        ensure_within_stock(&stock, amount)?;

        if !cart.contains(product_id) {
            debug!(product_id = %product_id, "Product not in cart; amount update is a no-op");
            return Ok(None);
        }

        Ok(Some(cart.with_amount(product_id, amount)?))
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Plans against a fresh snapshot and commits, re-planning when another
    /// commit lands first. `None` from the planner means "nothing to change".
    async fn run<F, Fut>(&self, operation: Operation, plan: F) -> CartResult<()>
    where
        F: Fn(Cart) -> Fut,
        Fut: Future<Output = CartResult<Option<Cart>>>,
    {
        let attempts = self.options.max_conflict_retries.saturating_add(1);

        for attempt in 1..=attempts {
            let (cart, expected) = self.snapshot().await;

            let Some(next) = plan(cart).await? else {
                return Ok(());
            };

            if self.commit(expected, next).await? {
                return Ok(());
            }

            debug!(
                operation = %operation,
                attempt,
                "Cart changed while planning; re-planning"
            );
        }

        Err(CartError::Conflict { attempts })
    }

    async fn snapshot(&self) -> (Cart, u64) {
        let revision = self.revision.lock().await;
        (self.state.borrow().clone(), *revision)
    }

    /// Returns `false` without side effects if `expected` is stale.
    async fn commit(&self, expected: u64, next: Cart) -> CartResult<bool> {
        let mut revision = self.revision.lock().await;
        if *revision != expected {
            return Ok(false);
        }

        save_cart(
            self.backends.storage.as_ref(),
            &self.options.storage_key,
            &next,
        )
        .await?;

        *revision += 1;
        self.state.send_replace(next);

        debug!(revision = *revision, "Cart committed");
        Ok(true)
    }

    fn report(&self, operation: Operation, product_id: ProductId, err: &CartError) {
        let notice = err.notice_for(operation);

        if err.is_rejection() {
            warn!(operation = %operation, product_id = %product_id, error = %err, "Cart operation rejected");
        } else {
            error!(operation = %operation, product_id = %product_id, error = %err, "Cart operation failed");
        }

        self.backends.notifier.notify(notice);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ServiceError, ServiceResult};
    use crate::notify::RecordingNotifier;
    use async_trait::async_trait;
    use rocket_core::{Money, NoticeKind, Product, Stock};
    use rocket_db::{DbResult, MemoryStore};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::oneshot;

    const KEY: &str = "@RocketShoes:cart";

    // -------------------------------------------------------------------------
    // Fakes
    // -------------------------------------------------------------------------

    /// Stock fake. The first call can be held on a gate until released.
    #[derive(Default)]
    struct FakeStock {
        amounts: std::sync::Mutex<HashMap<ProductId, i64>>,
        calls: AtomicUsize,
        gate: std::sync::Mutex<Option<oneshot::Receiver<()>>>,
    }

    impl FakeStock {
        fn with(amounts: &[(i64, i64)]) -> Arc<Self> {
            let stock = FakeStock::default();
            for &(id, amount) in amounts {
                stock.set(id, amount);
            }
            Arc::new(stock)
        }

        fn set(&self, id: i64, amount: i64) {
            self.amounts.lock().unwrap().insert(ProductId(id), amount);
        }

        fn hold_next_call(&self) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            *self.gate.lock().unwrap() = Some(rx);
            tx
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StockService for FakeStock {
        async fn stock(&self, product_id: ProductId) -> ServiceResult<Stock> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let gate = self.gate.lock().unwrap().take();
            if let Some(gate) = gate {
                gate.await.ok();
            }

            let amount = self.amounts.lock().unwrap().get(&product_id).copied();
            match amount {
                Some(amount) => Ok(Stock { id: product_id, amount }),
                None => Err(ServiceError::Status {
                    url: format!("http://localhost:3333/stock/{}", product_id),
                    status: 404,
                }),
            }
        }
    }

    #[derive(Default)]
    struct FakeCatalog {
        products: HashMap<ProductId, Product>,
        calls: AtomicUsize,
    }

    impl FakeCatalog {
        fn with(ids: &[i64]) -> Arc<Self> {
            let products = ids
                .iter()
                .map(|&id| (ProductId(id), product(id)))
                .collect();
            Arc::new(FakeCatalog {
                products,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProductCatalog for FakeCatalog {
        async fn product(&self, product_id: ProductId) -> ServiceResult<Product> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.products
                .get(&product_id)
                .cloned()
                .ok_or_else(|| ServiceError::Network {
                    url: format!("http://localhost:3333/products/{}", product_id),
                    reason: "connection refused".into(),
                })
        }
    }

    /// Reads succeed; every write fails.
    struct ReadOnlyStore(MemoryStore);

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
            self.0.get_item(key).await
        }

        async fn set_item(&self, _key: &str, _value: &str) -> DbResult<()> {
            Err(DbError::QueryFailed("disk I/O error".into()))
        }
    }

    // -------------------------------------------------------------------------
    // Harness
    // -------------------------------------------------------------------------

    fn product(id: i64) -> Product {
        Product {
            id: ProductId(id),
            title: if id == 5 { "Shoe".to_string() } else { format!("Tênis {}", id) },
            price: Money::from_cents(17990),
            image: format!("https://cdn.example/{}.jpg", id),
        }
    }

    fn item(id: i64, amount: i64) -> LineItem {
        LineItem {
            amount,
            ..LineItem::from_product(&product(id))
        }
    }

    fn persisted(items: Vec<LineItem>) -> String {
        serde_json::to_string(&Cart::from_items(items).unwrap()).unwrap()
    }

    struct Harness {
        store: Arc<CartStore>,
        storage: Arc<MemoryStore>,
        stock: Arc<FakeStock>,
        catalog: Arc<FakeCatalog>,
        notices: Arc<RecordingNotifier>,
    }

    impl Harness {
        async fn new(
            initial: Vec<LineItem>,
            stock: Arc<FakeStock>,
            catalog: Arc<FakeCatalog>,
        ) -> Self {
            Self::with_options(initial, stock, catalog, CartStoreOptions::default()).await
        }

        async fn with_options(
            initial: Vec<LineItem>,
            stock: Arc<FakeStock>,
            catalog: Arc<FakeCatalog>,
            options: CartStoreOptions,
        ) -> Self {
            let storage = Arc::new(if initial.is_empty() {
                MemoryStore::new()
            } else {
                MemoryStore::with_item(KEY, persisted(initial))
            });
            let notices = Arc::new(RecordingNotifier::new());

            let backends = CartBackends {
                storage: storage.clone(),
                stock: stock.clone(),
                catalog: catalog.clone(),
                notifier: notices.clone(),
            };
            let store = Arc::new(CartStore::open(backends, options).await.unwrap());

            Harness {
                store,
                storage,
                stock,
                catalog,
                notices,
            }
        }

        async fn persisted_cart(&self) -> Option<Cart> {
            load_cart(self.storage.as_ref(), KEY).await.unwrap()
        }

        fn amounts(&self) -> Vec<(i64, i64)> {
            self.store
                .cart()
                .items()
                .iter()
                .map(|item| (item.id.get(), item.amount))
                .collect()
        }
    }

    async fn wait_until(condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("condition not reached");
    }

    // -------------------------------------------------------------------------
    // Open
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_open_without_snapshot_is_empty() {
        let h = Harness::new(vec![], FakeStock::with(&[]), FakeCatalog::with(&[])).await;
        assert!(h.store.cart().is_empty());
        assert_eq!(h.store.revision().await, 0);
    }

    #[tokio::test]
    async fn test_open_restores_persisted_order() {
        let h = Harness::new(
            vec![item(3, 2), item(1, 1)],
            FakeStock::with(&[]),
            FakeCatalog::with(&[]),
        )
        .await;
        assert_eq!(h.amounts(), vec![(3, 2), (1, 1)]);
    }

    fn corrupt_backends() -> CartBackends {
        CartBackends {
            storage: Arc::new(MemoryStore::with_item(KEY, "[{\"id\":1,")),
            stock: FakeStock::with(&[]),
            catalog: FakeCatalog::with(&[]),
            notifier: Arc::new(RecordingNotifier::new()),
        }
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_resets_by_default() {
        let store = CartStore::open(corrupt_backends(), CartStoreOptions::default())
            .await
            .unwrap();
        assert!(store.cart().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_can_fail_open() {
        let options = CartStoreOptions {
            on_corrupt: CorruptStatePolicy::Fail,
            ..CartStoreOptions::default()
        };

        let err = CartStore::open(corrupt_backends(), options).await.unwrap_err();
        assert!(matches!(err, CartError::CorruptState { ref key, .. } if key == KEY));
    }

    #[tokio::test]
    async fn test_options_from_config() {
        let mut config = CartConfig::default();
        config.storage.key = "@RocketShoes:other".into();
        config.store.max_conflict_retries = 7;

        let options = CartStoreOptions::from(&config);
        assert_eq!(options.storage_key, "@RocketShoes:other");
        assert_eq!(options.max_conflict_retries, 7);
        assert_eq!(options.on_corrupt, CorruptStatePolicy::Reset);
    }

    // -------------------------------------------------------------------------
    // add_product
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_new_product_appends_with_amount_one() {
        let h = Harness::new(vec![], FakeStock::with(&[(5, 10)]), FakeCatalog::with(&[5])).await;

        h.store.add_product(ProductId(5)).await;

        let cart = h.store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].id, ProductId(5));
        assert_eq!(cart.items()[0].amount, 1);
        assert_eq!(cart.items()[0].title, "Shoe");
        assert_eq!(h.persisted_cart().await, Some(cart));
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_add_existing_product_increments_in_place() {
        let h = Harness::new(
            vec![item(1, 1), item(2, 1)],
            FakeStock::with(&[(1, 5)]),
            FakeCatalog::with(&[]),
        )
        .await;

        h.store.add_product(ProductId(1)).await;

        assert_eq!(h.amounts(), vec![(1, 2), (2, 1)]);
        assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.persisted_cart().await, Some(h.store.cart()));
    }

    #[tokio::test]
    async fn test_add_up_to_exact_stock_is_allowed() {
        let h = Harness::new(vec![item(1, 1)], FakeStock::with(&[(1, 2)]), FakeCatalog::with(&[])).await;

        h.store.add_product(ProductId(1)).await;

        assert_eq!(h.amounts(), vec![(1, 2)]);
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_add_beyond_stock_is_rejected() {
        let h = Harness::new(vec![item(1, 2)], FakeStock::with(&[(1, 2)]), FakeCatalog::with(&[])).await;

        let err = h.store.try_add_product(ProductId(1)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::Rule(CoreError::StockExceeded {
                available: 2,
                requested: 3,
                ..
            })
        ));

        h.store.add_product(ProductId(1)).await;
        assert_eq!(h.notices.notices(), vec![NoticeKind::StockExceeded]);
        assert_eq!(h.amounts(), vec![(1, 2)]);
        assert_eq!(h.store.revision().await, 0);
    }

    #[tokio::test]
    async fn test_add_with_zero_stock_never_fetches_catalog() {
        let h = Harness::new(vec![], FakeStock::with(&[(7, 0)]), FakeCatalog::with(&[7])).await;

        h.store.add_product(ProductId(7)).await;

        assert!(h.store.cart().is_empty());
        assert_eq!(h.notices.notices(), vec![NoticeKind::StockExceeded]);
        assert_eq!(h.catalog.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_add_stock_failure_notifies_generic() {
        let h = Harness::new(vec![], FakeStock::with(&[]), FakeCatalog::with(&[1])).await;

        h.store.add_product(ProductId(1)).await;

        assert!(h.store.cart().is_empty());
        assert_eq!(h.notices.notices(), vec![NoticeKind::AddFailed]);
        assert_eq!(h.persisted_cart().await, None);
    }

    #[tokio::test]
    async fn test_add_catalog_failure_notifies_generic() {
        let h = Harness::new(vec![], FakeStock::with(&[(8, 3)]), FakeCatalog::with(&[])).await;

        h.store.add_product(ProductId(8)).await;

        assert!(h.store.cart().is_empty());
        assert_eq!(h.notices.notices(), vec![NoticeKind::AddFailed]);
    }

    #[tokio::test]
    async fn test_add_at_amount_limit_notifies_generic() {
        let h = Harness::new(
            vec![item(1, i64::MAX)],
            FakeStock::with(&[(1, i64::MAX)]),
            FakeCatalog::with(&[]),
        )
        .await;

        let err = h.store.try_add_product(ProductId(1)).await.unwrap_err();
        assert!(matches!(err, CartError::Rule(CoreError::AmountOverflow { .. })));

        h.store.add_product(ProductId(1)).await;
        assert_eq!(h.notices.notices(), vec![NoticeKind::AddFailed]);
        assert_eq!(h.amounts(), vec![(1, i64::MAX)]);
        assert_eq!(h.stock.calls(), 0);
        assert_eq!(h.store.revision().await, 0);
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_memory_unchanged() {
        let notices = Arc::new(RecordingNotifier::new());
        let backends = CartBackends {
            storage: Arc::new(ReadOnlyStore(MemoryStore::with_item(
                KEY,
                persisted(vec![item(1, 1)]),
            ))),
            stock: FakeStock::with(&[(1, 5), (2, 5)]),
            catalog: FakeCatalog::with(&[2]),
            notifier: notices.clone(),
        };
        let store = CartStore::open(backends, CartStoreOptions::default())
            .await
            .unwrap();
        let mut changes = store.subscribe();

        store.add_product(ProductId(2)).await;
        store.remove_product(ProductId(1)).await;
        store
            .update_product_amount(UpdateProductAmount::new(1, 3))
            .await;

        assert_eq!(store.cart().len(), 1);
        assert_eq!(store.cart().amount_of(ProductId(1)), 1);
        assert_eq!(store.revision().await, 0);
        assert!(!changes.has_changed().unwrap());
        assert_eq!(
            notices.notices(),
            vec![
                NoticeKind::AddFailed,
                NoticeKind::RemoveFailed,
                NoticeKind::UpdateFailed
            ]
        );
    }

    // -------------------------------------------------------------------------
    // remove_product
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_remove_keeps_relative_order() {
        let h = Harness::new(
            vec![item(1, 1), item(2, 3), item(3, 1)],
            FakeStock::with(&[]),
            FakeCatalog::with(&[]),
        )
        .await;

        h.store.remove_product(ProductId(2)).await;

        assert_eq!(h.amounts(), vec![(1, 1), (3, 1)]);
        assert_eq!(h.persisted_cart().await, Some(h.store.cart()));
        assert_eq!(h.stock.calls(), 0);
    }

    #[tokio::test]
    async fn test_remove_last_item_persists_empty_array() {
        let h = Harness::new(vec![item(4, 1)], FakeStock::with(&[]), FakeCatalog::with(&[])).await;

        h.store.remove_product(ProductId(4)).await;

        assert!(h.store.cart().is_empty());
        assert_eq!(
            h.storage.get_item(KEY).await.unwrap().as_deref(),
            Some("[]")
        );
    }

    #[tokio::test]
    async fn test_remove_missing_product_notifies() {
        let h = Harness::new(vec![item(1, 1)], FakeStock::with(&[]), FakeCatalog::with(&[])).await;

        h.store.remove_product(ProductId(9)).await;

        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert_eq!(h.notices.notices(), vec![NoticeKind::RemoveFailed]);
    }

    // -------------------------------------------------------------------------
    // update_product_amount
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_sets_amount() {
        let h = Harness::new(
            vec![item(1, 1), item(2, 1)],
            FakeStock::with(&[(2, 4)]),
            FakeCatalog::with(&[]),
        )
        .await;

        h.store
            .update_product_amount(UpdateProductAmount::new(2, 4))
            .await;

        assert_eq!(h.amounts(), vec![(1, 1), (2, 4)]);
        assert_eq!(h.persisted_cart().await, Some(h.store.cart()));
        assert!(h.notices.notices().is_empty());
    }

    #[tokio::test]
    async fn test_update_below_one_skips_remote_call() {
        let h = Harness::new(vec![item(1, 2)], FakeStock::with(&[(1, 5)]), FakeCatalog::with(&[])).await;

        h.store
            .update_product_amount(UpdateProductAmount::new(1, 0))
            .await;

        assert_eq!(h.amounts(), vec![(1, 2)]);
        assert_eq!(h.notices.notices(), vec![NoticeKind::UpdateFailed]);
        assert_eq!(h.stock.calls(), 0);
    }

    #[tokio::test]
    async fn test_update_beyond_stock_is_rejected() {
        let h = Harness::new(vec![item(1, 2)], FakeStock::with(&[(1, 3)]), FakeCatalog::with(&[])).await;

        h.store
            .update_product_amount(UpdateProductAmount::new(1, 4))
            .await;

        assert_eq!(h.amounts(), vec![(1, 2)]);
        assert_eq!(h.notices.notices(), vec![NoticeKind::StockExceeded]);
    }

    #[tokio::test]
    async fn test_totals_after_huge_update_saturate() {
        let h = Harness::new(
            vec![item(1, 1)],
            FakeStock::with(&[(1, 10_000_000_000_000_000)]),
            FakeCatalog::with(&[]),
        )
        .await;

        h.store
            .update_product_amount(UpdateProductAmount::new(1, 1_000_000_000_000_000))
            .await;
        assert!(h.notices.notices().is_empty());

        let totals = h.store.totals();
        assert_eq!(totals.total_quantity, 1_000_000_000_000_000);
        assert_eq!(totals.subtotal, Money::from_cents(i64::MAX));
        assert_eq!(h.store.cart().items()[0].subtotal(), Money::from_cents(i64::MAX));
    }

    #[tokio::test]
    async fn test_update_unknown_product_is_silent_noop() {
        let h = Harness::new(vec![item(1, 1)], FakeStock::with(&[(9, 10)]), FakeCatalog::with(&[])).await;
        let before = h.storage.get_item(KEY).await.unwrap();

        h.store
            .try_update_product_amount(UpdateProductAmount::new(9, 2))
            .await
            .unwrap();

        assert_eq!(h.amounts(), vec![(1, 1)]);
        assert!(h.notices.notices().is_empty());
        assert_eq!(h.store.revision().await, 0);
        assert_eq!(h.storage.get_item(KEY).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_stock_failure_notifies_generic() {
        let h = Harness::new(vec![item(1, 1)], FakeStock::with(&[]), FakeCatalog::with(&[])).await;

        h.store
            .update_product_amount(UpdateProductAmount::new(1, 2))
            .await;

        assert_eq!(h.notices.notices(), vec![NoticeKind::UpdateFailed]);
    }

    // -------------------------------------------------------------------------
    // Subscribers & Concurrency
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_subscribers_see_each_commit() {
        let h = Harness::new(vec![], FakeStock::with(&[(5, 10)]), FakeCatalog::with(&[5])).await;
        let mut changes = h.store.subscribe();

        h.store.add_product(ProductId(5)).await;
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().amount_of(ProductId(5)), 1);

        h.store.add_product(ProductId(5)).await;
        assert_eq!(changes.borrow_and_update().amount_of(ProductId(5)), 2);
        assert_eq!(h.store.totals().total_quantity, 2);
        assert_eq!(h.store.revision().await, 2);
    }

    #[tokio::test]
    async fn test_interleaved_adds_both_land() {
        let h = Harness::new(vec![item(1, 1)], FakeStock::with(&[(1, 10)]), FakeCatalog::with(&[])).await;
        let release = h.stock.hold_next_call();

        // A parks on its stock lookup with a snapshot where amount = 1
        let slow = tokio::spawn({
            let store = h.store.clone();
            async move { store.try_add_product(ProductId(1)).await }
        });
        let stock = h.stock.clone();
        wait_until(move || stock.calls() >= 1).await;

        // B commits amount = 2 while A is parked
        h.store.try_add_product(ProductId(1)).await.unwrap();
        assert_eq!(h.amounts(), vec![(1, 2)]);

        release.send(()).unwrap();
        slow.await.unwrap().unwrap();

        assert_eq!(h.amounts(), vec![(1, 3)]);
        assert_eq!(h.persisted_cart().await, Some(h.store.cart()));
        // A re-planned with a fresh stock lookup
        assert_eq!(h.stock.calls(), 3);
    }

    #[tokio::test]
    async fn test_replan_uses_fresh_stock() {
        let h = Harness::new(vec![item(1, 1)], FakeStock::with(&[(1, 2)]), FakeCatalog::with(&[])).await;
        let release = h.stock.hold_next_call();

        let slow = tokio::spawn({
            let store = h.store.clone();
            async move { store.try_add_product(ProductId(1)).await }
        });
        let stock = h.stock.clone();
        wait_until(move || stock.calls() >= 1).await;

        // B takes the last unit
        h.store.try_add_product(ProductId(1)).await.unwrap();

        release.send(()).unwrap();
        let err = slow.await.unwrap().unwrap_err();

        assert!(matches!(err, CartError::Rule(CoreError::StockExceeded { .. })));
        assert_eq!(h.amounts(), vec![(1, 2)]);
    }

    #[tokio::test]
    async fn test_conflict_exhaustion_notifies_generic() {
        let options = CartStoreOptions {
            max_conflict_retries: 0,
            ..CartStoreOptions::default()
        };
        let h = Harness::with_options(
            vec![item(1, 1)],
            FakeStock::with(&[(1, 10)]),
            FakeCatalog::with(&[]),
            options,
        )
        .await;
        let release = h.stock.hold_next_call();

        let slow = tokio::spawn({
            let store = h.store.clone();
            async move { store.add_product(ProductId(1)).await }
        });
        let stock = h.stock.clone();
        wait_until(move || stock.calls() >= 1).await;

        h.store.remove_product(ProductId(1)).await;

        release.send(()).unwrap();
        slow.await.unwrap();

        assert!(h.store.cart().is_empty());
        assert_eq!(h.notices.notices(), vec![NoticeKind::AddFailed]);
    }
}
