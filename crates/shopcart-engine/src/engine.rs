//! # Cart Engine
//!
//! Cart mutation and checkout on top of the store traits.
//!
//! ## User Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Browse ──► add_to_cart ──► add_to_cart ──► remove_from_cart ──►       │
//! │                 │                                                      │
//! │                 └─ stock checked, NOT reserved                         │
//! │                                                                         │
//! │  checkout(coupon?) ──► price ──► verify ──► decrement ──► discount     │
//! │                                   └──────── one unit of work ────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adding to the cart only checks stock. Stock is taken at checkout, inside
//! the unit of work, with a conditional decrement.

use std::sync::Arc;

use shopcart_core::{
    CartItemView, CartSummary, CheckoutReceipt, CoreError, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};
use tracing::{debug, instrument, warn};

use crate::checkout;
use crate::error::{EngineError, EngineResult};
use crate::store::{CartStore, CheckoutStore, ProductStore};

/// Orchestrates cart operations. Cheap to clone; holds only store handles.
#[derive(Clone)]
pub struct CartEngine {
    products: Arc<dyn ProductStore>,
    carts: Arc<dyn CartStore>,
    checkout: Arc<dyn CheckoutStore>,
}

impl CartEngine {
    pub fn new(
        products: Arc<dyn ProductStore>,
        carts: Arc<dyn CartStore>,
        checkout: Arc<dyn CheckoutStore>,
    ) -> Self {
        CartEngine {
            products,
            carts,
            checkout,
        }
    }

    /// Builds an engine where one backend provides every capability.
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: ProductStore + CartStore + CheckoutStore + 'static,
    {
        CartEngine::new(store.clone(), store.clone(), store)
    }

    async fn cart_id(&self, user_id: &str) -> EngineResult<String> {
        self.carts
            .cart_id_for_user(user_id)
            .await
            .map_err(EngineError::persistence("resolve cart", user_id))?
            .ok_or_else(|| CoreError::not_found("Cart", user_id).into())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Line items of the user's cart, priced at current product prices.
    #[instrument(skip(self))]
    pub async fn cart_items(&self, user_id: &str) -> EngineResult<Vec<CartItemView>> {
        let cart_id = self.cart_id(user_id).await?;
        self.carts
            .items(&cart_id)
            .await
            .map_err(EngineError::persistence("load cart items", &cart_id))
    }

    /// Items plus count, total quantity and subtotal.
    pub async fn cart_summary(&self, user_id: &str) -> EngineResult<CartSummary> {
        Ok(CartSummary::from_items(self.cart_items(user_id).await?)?)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of a product to the user's cart.
    ///
    /// ## Checks (in order)
    /// ```text
    /// product exists?           ── no ──► NotFound("Product")
    /// stock > 0?                ── no ──► OutOfStock
    /// cart exists?              ── no ──► NotFound("Cart")
    /// stock >= in_cart + 1?     ── no ──► InsufficientStock
    /// in_cart + 1 <= 999?       ── no ──► QuantityTooLarge
    /// new line and 100 lines?   ── yes ─► CartTooLarge
    /// upsert (+1)
    /// ```
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self, user_id: &str, product_id: &str) -> EngineResult<()> {
        let product = self
            .products
            .get_by_id(product_id)
            .await
            .map_err(EngineError::persistence("load product", product_id))?
            .ok_or_else(|| CoreError::not_found("Product", product_id))?;

        if !product.in_stock() {
            warn!(product_id = %product.id, "add rejected: out of stock");
            return Err(CoreError::OutOfStock {
                product_id: product.id,
                name: product.name,
            }
            .into());
        }

        let cart_id = self.cart_id(user_id).await?;
        let current = self
            .carts
            .item_quantity(&cart_id, product_id)
            .await
            .map_err(EngineError::persistence("load cart item", product_id))?;
        let requested = current + 1;

        if !product.can_fulfill(requested) {
            warn!(product_id = %product.id, available = product.stock, requested, "add rejected: insufficient stock");
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                available: product.stock,
                requested,
            }
            .into());
        }

        if requested > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested,
                max: MAX_ITEM_QUANTITY,
            }
            .into());
        }

        if current == 0 {
            let lines = self
                .carts
                .items(&cart_id)
                .await
                .map_err(EngineError::persistence("load cart items", &cart_id))?;
            if lines.len() >= MAX_CART_ITEMS {
                return Err(CoreError::CartTooLarge {
                    max: MAX_CART_ITEMS,
                }
                .into());
            }
        }

        self.carts
            .upsert_item(&cart_id, product_id)
            .await
            .map_err(EngineError::persistence("add cart item", product_id))?;

        debug!(cart_id = %cart_id, product_id = %product_id, quantity = requested, "item added");
        Ok(())
    }

    /// Removes one unit of a product; the line disappears when it reaches zero.
    ///
    /// Stock is untouched: it was never taken.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> EngineResult<()> {
        let cart_id = self.cart_id(user_id).await?;

        let not_in_cart = || CoreError::NotInCart {
            product_id: product_id.to_string(),
        };

        let current = self
            .carts
            .item_quantity(&cart_id, product_id)
            .await
            .map_err(EngineError::persistence("load cart item", product_id))?;
        if current == 0 {
            return Err(not_in_cart().into());
        }

        let removed = self
            .carts
            .decrement_or_delete(&cart_id, product_id)
            .await
            .map_err(EngineError::persistence("remove cart item", product_id))?;
        if !removed {
            return Err(not_in_cart().into());
        }

        debug!(cart_id = %cart_id, product_id = %product_id, quantity = current - 1, "item removed");
        Ok(())
    }

    /// Checks out the user's cart, optionally applying a coupon.
    ///
    /// See [`checkout`](crate::checkout) for the state machine. On any error
    /// stock and cart are left exactly as they were.
    #[instrument(skip(self))]
    pub async fn checkout(
        &self,
        user_id: &str,
        coupon_code: Option<&str>,
    ) -> EngineResult<CheckoutReceipt> {
        let cart_id = self.cart_id(user_id).await?;
        checkout::run(self.checkout.as_ref(), &cart_id, coupon_code).await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::admin::{AdminService, NewProduct};
    use crate::store::{CouponStore, UserStore};
    use shopcart_core::{
        Cart, Coupon, DiscountRate, Money, Product, User, UserRole, ValidationError,
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        engine: CartEngine,
        user_id: String,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = User::new("Ada", "ada@example.com", "hash", UserRole::Customer);
        store
            .create_with_cart(&user, &Cart::for_user(&user.id))
            .await
            .unwrap();
        Fixture {
            engine: CartEngine::from_store(store.clone()),
            store,
            user_id: user.id,
        }
    }

    impl Fixture {
        async fn product(&self, name: &str, price: i64, stock: i64) -> Product {
            let product = Product::new(name, Money::from_cents(price), stock);
            ProductStore::insert(self.store.as_ref(), &product).await.unwrap();
            product
        }

        async fn coupon(&self, code: &str, bps: u32) {
            CouponStore::insert(self.store.as_ref(), &Coupon::new(code, DiscountRate::from_bps(bps)))
                .await
                .unwrap();
        }

        async fn add(&self, product_id: &str) -> EngineResult<()> {
            self.engine.add_to_cart(&self.user_id, product_id).await
        }
    }

    fn core(err: EngineError) -> CoreError {
        match err {
            EngineError::Core(err) => err,
            other => panic!("expected business error, got {other:?}"),
        }
    }

    // -------------------------------------------------------------------------
    // add_to_cart
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_add_twice_makes_one_line_of_two() {
        let f = fixture().await;
        let mug = f.product("Mug", 1299, 5).await;

        f.add(&mug.id).await.unwrap();
        f.add(&mug.id).await.unwrap();

        let items = f.engine.cart_items(&f.user_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].product_name, "Mug");
    }

    #[tokio::test]
    async fn test_add_does_not_touch_stock() {
        let f = fixture().await;
        let mug = f.product("Mug", 1299, 5).await;
        f.add(&mug.id).await.unwrap();
        assert_eq!(f.store.stock_of(&mug.id).await, Some(5));
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let f = fixture().await;
        let err = core(f.add("missing").await.unwrap_err());
        assert!(matches!(err, CoreError::NotFound { ref entity, .. } if entity == "Product"));
    }

    #[tokio::test]
    async fn test_add_out_of_stock() {
        let f = fixture().await;
        let ghost = f.product("Ghost", 100, 0).await;
        assert!(matches!(
            core(f.add(&ghost.id).await.unwrap_err()),
            CoreError::OutOfStock { .. }
        ));
        assert!(f.engine.cart_items(&f.user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_beyond_stock_is_insufficient() {
        let f = fixture().await;
        let lamp = f.product("Lamp", 5000, 3).await;
        for _ in 0..3 {
            f.add(&lamp.id).await.unwrap();
        }

        let err = core(f.add(&lamp.id).await.unwrap_err());
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product_id: lamp.id.clone(),
                available: 3,
                requested: 4,
            }
        );
        assert_eq!(f.engine.cart_items(&f.user_id).await.unwrap()[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_add_without_cart_is_not_found() {
        let f = fixture().await;
        let mug = f.product("Mug", 1299, 5).await;
        let err = core(f.engine.add_to_cart("no-such-user", &mug.id).await.unwrap_err());
        assert!(matches!(err, CoreError::NotFound { ref entity, .. } if entity == "Cart"));
    }

    #[tokio::test]
    async fn test_add_respects_line_quantity_cap() {
        let f = fixture().await;
        let pen = f.product("Pen", 10, 5_000).await;
        for _ in 0..MAX_ITEM_QUANTITY {
            f.add(&pen.id).await.unwrap();
        }
        assert!(matches!(
            core(f.add(&pen.id).await.unwrap_err()),
            CoreError::QuantityTooLarge { requested: 1000, max: 999 }
        ));
    }

    #[tokio::test]
    async fn test_add_respects_line_count_cap() {
        let f = fixture().await;
        for i in 0..MAX_CART_ITEMS {
            let p = f.product(&format!("Item {i:03}"), 100, 1).await;
            f.add(&p.id).await.unwrap();
        }
        let extra = f.product("One too many", 100, 1).await;
        assert!(matches!(
            core(f.add(&extra.id).await.unwrap_err()),
            CoreError::CartTooLarge { max: 100 }
        ));
    }

    #[tokio::test]
    async fn test_items_reflect_live_price() {
        let f = fixture().await;
        let mut mug = f.product("Mug", 1299, 5).await;
        f.add(&mug.id).await.unwrap();

        mug.price = Money::from_cents(999);
        ProductStore::update(f.store.as_ref(), &mug).await.unwrap();

        let summary = f.engine.cart_summary(&f.user_id).await.unwrap();
        assert_eq!(summary.items[0].price.cents(), 999);
        assert_eq!(summary.subtotal.cents(), 999);
    }

    #[tokio::test]
    async fn test_items_keep_insertion_order() {
        let f = fixture().await;
        let b = f.product("B", 100, 5).await;
        let a = f.product("A", 100, 5).await;
        f.add(&b.id).await.unwrap();
        f.add(&a.id).await.unwrap();
        f.add(&b.id).await.unwrap();

        let ids: Vec<String> = f
            .engine
            .cart_items(&f.user_id)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.product_id)
            .collect();
        assert_eq!(ids, vec![b.id, a.id]);
    }

    // -------------------------------------------------------------------------
    // remove_from_cart
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_remove_decrements_then_deletes() {
        let f = fixture().await;
        let mug = f.product("Mug", 1299, 5).await;
        f.add(&mug.id).await.unwrap();
        f.add(&mug.id).await.unwrap();

        f.engine.remove_from_cart(&f.user_id, &mug.id).await.unwrap();
        assert_eq!(f.engine.cart_items(&f.user_id).await.unwrap()[0].quantity, 1);

        f.engine.remove_from_cart(&f.user_id, &mug.id).await.unwrap();
        assert!(f.engine.cart_items(&f.user_id).await.unwrap().is_empty());
        assert_eq!(f.store.stock_of(&mug.id).await, Some(5));
    }

    #[tokio::test]
    async fn test_remove_absent_item_leaves_cart_unchanged() {
        let f = fixture().await;
        let mug = f.product("Mug", 1299, 5).await;
        let lamp = f.product("Lamp", 5000, 5).await;
        f.add(&mug.id).await.unwrap();

        let err = core(f.engine.remove_from_cart(&f.user_id, &lamp.id).await.unwrap_err());
        assert!(matches!(err, CoreError::NotInCart { .. }));

        let items = f.engine.cart_items(&f.user_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 1);
    }

    // -------------------------------------------------------------------------
    // checkout
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_checkout_clears_cart_and_takes_stock() {
        let f = fixture().await;
        let mug = f.product("Mug", 1299, 5).await;
        let lamp = f.product("Lamp", 5000, 2).await;
        f.add(&mug.id).await.unwrap();
        f.add(&mug.id).await.unwrap();
        f.add(&lamp.id).await.unwrap();

        let receipt = f.engine.checkout(&f.user_id, None).await.unwrap();
        assert_eq!(receipt.subtotal.cents(), 2 * 1299 + 5000);
        assert_eq!(receipt.total, receipt.subtotal);

        assert!(f.engine.cart_items(&f.user_id).await.unwrap().is_empty());
        assert_eq!(f.store.stock_of(&mug.id).await, Some(3));
        assert_eq!(f.store.stock_of(&lamp.id).await, Some(1));
    }

    #[tokio::test]
    async fn test_checkout_with_ten_percent_coupon() {
        let f = fixture().await;
        let chair = f.product("Chair", 10_000, 5).await;
        f.coupon("SAVE10", 1000).await;
        f.add(&chair.id).await.unwrap();
        f.add(&chair.id).await.unwrap();

        let receipt = f.engine.checkout(&f.user_id, Some("SAVE10")).await.unwrap();
        assert_eq!(receipt.subtotal.cents(), 20_000);
        assert_eq!(receipt.discount.cents(), 2_000);
        assert_eq!(receipt.total.cents(), 18_000);
        assert_eq!(receipt.coupon_code.as_deref(), Some("SAVE10"));
    }

    #[tokio::test]
    async fn test_checkout_unknown_coupon_changes_nothing() {
        let f = fixture().await;
        let chair = f.product("Chair", 10_000, 5).await;
        f.add(&chair.id).await.unwrap();
        f.add(&chair.id).await.unwrap();

        let err = core(f.engine.checkout(&f.user_id, Some("BOGUS")).await.unwrap_err());
        assert_eq!(
            err,
            CoreError::InvalidCoupon {
                code: "BOGUS".to_string()
            }
        );

        assert_eq!(f.store.stock_of(&chair.id).await, Some(5));
        let items = f.engine.cart_items(&f.user_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let f = fixture().await;
        assert!(matches!(
            core(f.engine.checkout(&f.user_id, None).await.unwrap_err()),
            CoreError::EmptyCart { .. }
        ));
    }

    #[tokio::test]
    async fn test_checkout_without_cart_is_not_found() {
        let f = fixture().await;
        assert!(matches!(
            core(f.engine.checkout("ghost", None).await.unwrap_err()),
            CoreError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_admin_rejects_price_that_could_overflow_a_cart() {
        let f = fixture().await;
        let admin = AdminService::new(f.store.clone(), f.store.clone());

        let err = admin
            .create_product(NewProduct {
                name: "Yacht".to_string(),
                price: Money::from_cents(i64::MAX / 2 + 1),
                stock: 5,
            })
            .await
            .unwrap_err();
        assert!(matches!(
            core(err),
            CoreError::Validation(ValidationError::OutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_overflowing_cart_total_is_refused_without_side_effects() {
        let f = fixture().await;
        // a row written before the price ceiling existed
        let yacht = f.product("Yacht", i64::MAX / 2 + 1, 5).await;
        f.add(&yacht.id).await.unwrap();
        f.add(&yacht.id).await.unwrap();

        let err = core(f.engine.cart_summary(&f.user_id).await.unwrap_err());
        assert!(matches!(err, CoreError::AmountTooLarge { .. }));

        let err = core(f.engine.checkout(&f.user_id, None).await.unwrap_err());
        assert!(matches!(err, CoreError::AmountTooLarge { .. }));

        assert_eq!(f.store.stock_of(&yacht.id).await, Some(5));
        let items = f.engine.cart_items(&f.user_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_concurrent_checkouts_never_oversell() {
        const STOCK: i64 = 7;
        const QTY: i64 = 2;
        const BUYERS: usize = 10;

        let store = Arc::new(MemoryStore::new());
        let engine = CartEngine::from_store(store.clone());
        let product = Product::new("Limited", Money::from_cents(2500), BUYERS as i64 * QTY);
        ProductStore::insert(store.as_ref(), &product).await.unwrap();

        let mut buyers = Vec::new();
        for i in 0..BUYERS {
            let user = User::new(
                format!("Buyer {i}"),
                format!("buyer{i}@example.com"),
                "hash",
                UserRole::Customer,
            );
            store
                .create_with_cart(&user, &Cart::for_user(&user.id))
                .await
                .unwrap();
            for _ in 0..QTY {
                engine.add_to_cart(&user.id, &product.id).await.unwrap();
            }
            buyers.push(user.id);
        }

        // carts were filled while stock was plentiful; now shrink it
        let mut limited = product.clone();
        limited.stock = STOCK;
        ProductStore::update(store.as_ref(), &limited).await.unwrap();

        let handles: Vec<_> = buyers
            .into_iter()
            .map(|user_id| {
                let engine = engine.clone();
                tokio::spawn(async move { engine.checkout(&user_id, None).await })
            })
            .collect();

        let mut succeeded = 0;
        let mut insufficient = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(EngineError::Core(CoreError::InsufficientStock { .. })) => insufficient += 1,
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(succeeded, (STOCK / QTY) as usize);
        assert_eq!(insufficient, BUYERS - succeeded);
        assert_eq!(store.stock_of(&product.id).await, Some(STOCK % QTY));
    }
}
