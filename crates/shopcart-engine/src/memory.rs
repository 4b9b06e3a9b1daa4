//! # In-Memory Store
//!
//! A single struct implementing every store trait over one
//! `tokio::sync::Mutex`. Used by the engine and API tests, and as a
//! throwaway backend for local experiments.
//!
//! ## Checkout Isolation
//! ```text
//! begin() ──► lock_owned()  ──►  staged = state.clone()
//!                │                      │ take_stock / clear_cart
//!                │ (other writers wait) ▼
//!                │               commit(): *guard = staged
//!                ▼
//!          drop(unit) without commit ──► staged discarded, guard released
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use shopcart_core::{Cart, CartItem, CartItemView, Coupon, Product, User};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{StoreError, StoreResult};
use crate::store::{CartStore, CheckoutStore, CheckoutUnit, CouponStore, ProductStore, UserStore};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    products: HashMap<String, Product>,
    coupons: HashMap<String, Coupon>,
    carts: HashMap<String, Cart>,
    /// Insertion-ordered, which is also `added_at` order.
    cart_items: Vec<CartItem>,
    users: HashMap<String, User>,
}

impl MemoryState {
    fn items_view(&self, cart_id: &str) -> Vec<CartItemView> {
        self.cart_items
            .iter()
            .filter(|item| item.cart_id == cart_id)
            .filter_map(|item| {
                self.products.get(&item.product_id).map(|p| CartItemView {
                    product_id: p.id.clone(),
                    product_name: p.name.clone(),
                    price: p.price,
                    quantity: item.quantity,
                })
            })
            .collect()
    }

    fn line_mut(&mut self, cart_id: &str, product_id: &str) -> Option<&mut CartItem> {
        self.cart_items
            .iter_mut()
            .find(|item| item.cart_id == cart_id && item.product_id == product_id)
    }
}

/// Shared in-memory backend. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stock of a product, for assertions.
    pub async fn stock_of(&self, product_id: &str) -> Option<i64> {
        self.state.lock().await.products.get(product_id).map(|p| p.stock)
    }
}

// =============================================================================
// ProductStore
// =============================================================================

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.state.lock().await.products.get(id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        let mut products: Vec<Product> = self.state.lock().await.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Product>> {
        let needle = query.to_lowercase();
        let mut products: Vec<Product> = self
            .state
            .lock()
            .await
            .products
            .values()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn insert(&self, product: &Product) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.products.contains_key(&product.id) {
            return Err(StoreError::Conflict(format!("product {} exists", product.id)));
        }
        state.products.insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        match state.products.get_mut(&product.id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(())
            }
            None => Err(StoreError::not_found("Product", &product.id)),
        }
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.products.remove(id).is_none() {
            return Err(StoreError::not_found("Product", id));
        }
        state.cart_items.retain(|item| item.product_id != id);
        Ok(())
    }
}

// =============================================================================
// CouponStore
// =============================================================================

#[async_trait]
impl CouponStore for MemoryStore {
    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        Ok(self.state.lock().await.coupons.get(code).cloned())
    }

    async fn insert(&self, coupon: &Coupon) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.coupons.contains_key(&coupon.code) {
            return Err(StoreError::Conflict(format!("coupon {} exists", coupon.code)));
        }
        state.coupons.insert(coupon.code.clone(), coupon.clone());
        Ok(())
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        match self.state.lock().await.coupons.remove(code) {
            Some(_) => Ok(()),
            None => Err(StoreError::not_found("Coupon", code)),
        }
    }
}

// =============================================================================
// CartStore
// =============================================================================

#[async_trait]
impl CartStore for MemoryStore {
    async fn create_cart(&self, cart: &Cart) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.carts.values().any(|c| c.user_id == cart.user_id) {
            return Err(StoreError::Conflict(format!(
                "user {} already has a cart",
                cart.user_id
            )));
        }
        state.carts.insert(cart.id.clone(), cart.clone());
        Ok(())
    }

    async fn cart_id_for_user(&self, user_id: &str) -> StoreResult<Option<String>> {
        Ok(self
            .state
            .lock()
            .await
            .carts
            .values()
            .find(|c| c.user_id == user_id)
            .map(|c| c.id.clone()))
    }

    async fn items(&self, cart_id: &str) -> StoreResult<Vec<CartItemView>> {
        Ok(self.state.lock().await.items_view(cart_id))
    }

    async fn item_quantity(&self, cart_id: &str, product_id: &str) -> StoreResult<i64> {
        let state = self.state.lock().await;
        Ok(state
            .cart_items
            .iter()
            .find(|item| item.cart_id == cart_id && item.product_id == product_id)
            .map_or(0, |item| item.quantity))
    }

    async fn upsert_item(&self, cart_id: &str, product_id: &str) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if !state.carts.contains_key(cart_id) {
            return Err(StoreError::Conflict(format!("cart {cart_id} does not exist")));
        }
        if !state.products.contains_key(product_id) {
            return Err(StoreError::Conflict(format!("product {product_id} does not exist")));
        }
        match state.line_mut(cart_id, product_id) {
            Some(line) => line.quantity += 1,
            None => state.cart_items.push(CartItem {
                cart_id: cart_id.to_string(),
                product_id: product_id.to_string(),
                quantity: 1,
                added_at: chrono::Utc::now(),
            }),
        }
        Ok(())
    }

    async fn decrement_or_delete(&self, cart_id: &str, product_id: &str) -> StoreResult<bool> {
        let mut state = self.state.lock().await;
        let Some(line) = state.line_mut(cart_id, product_id) else {
            return Ok(false);
        };
        line.quantity -= 1;
        if line.quantity <= 0 {
            state
                .cart_items
                .retain(|item| !(item.cart_id == cart_id && item.product_id == product_id));
        }
        Ok(true)
    }

    async fn clear(&self, cart_id: &str) -> StoreResult<()> {
        self.state
            .lock()
            .await
            .cart_items
            .retain(|item| item.cart_id != cart_id);
        Ok(())
    }
}

// =============================================================================
// UserStore
// =============================================================================

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_with_cart(&self, user: &User, cart: &Cart) -> StoreResult<()> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email {} exists", user.email)));
        }
        state.users.insert(user.id.clone(), user.clone());
        state.carts.insert(cart.id.clone(), cart.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.state.lock().await.users.get(id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .state
            .lock()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

// =============================================================================
// Checkout
// =============================================================================

#[async_trait]
impl CheckoutStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn CheckoutUnit>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryCheckoutUnit { guard, staged }))
    }
}

/// Holds the store lock for its whole life; writes go to `staged`.
struct MemoryCheckoutUnit {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl CheckoutUnit for MemoryCheckoutUnit {
    async fn items(&mut self, cart_id: &str) -> StoreResult<Vec<CartItemView>> {
        Ok(self.staged.items_view(cart_id))
    }

    async fn product(&mut self, product_id: &str) -> StoreResult<Option<Product>> {
        Ok(self.staged.products.get(product_id).cloned())
    }

    async fn take_stock(&mut self, product_id: &str, quantity: i64) -> StoreResult<bool> {
        match self.staged.products.get_mut(product_id) {
            Some(product) if product.stock >= quantity => {
                product.stock -= quantity;
                product.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn coupon(&mut self, code: &str) -> StoreResult<Option<Coupon>> {
        Ok(self.staged.coupons.get(code).cloned())
    }

    async fn clear_cart(&mut self, cart_id: &str) -> StoreResult<()> {
        self.staged.cart_items.retain(|item| item.cart_id != cart_id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryCheckoutUnit { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcart_core::{DiscountRate, Money, UserRole};

    async fn store_with_cart() -> (MemoryStore, String, Product) {
        let store = MemoryStore::new();
        let user = User::new("Ada", "ada@example.com", "hash", UserRole::Customer);
        let cart = Cart::for_user(&user.id);
        store.create_with_cart(&user, &cart).await.unwrap();
        let product = Product::new("Mug", Money::from_cents(1299), 5);
        ProductStore::insert(&store, &product).await.unwrap();
        (store, cart.id, product)
    }

    #[tokio::test]
    async fn test_upsert_increments_single_line() {
        let (store, cart_id, product) = store_with_cart().await;
        store.upsert_item(&cart_id, &product.id).await.unwrap();
        store.upsert_item(&cart_id, &product.id).await.unwrap();

        let items = store.items(&cart_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(store.item_quantity(&cart_id, &product.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_decrement_deletes_at_zero() {
        let (store, cart_id, product) = store_with_cart().await;
        store.upsert_item(&cart_id, &product.id).await.unwrap();

        assert!(store.decrement_or_delete(&cart_id, &product.id).await.unwrap());
        assert!(store.items(&cart_id).await.unwrap().is_empty());
        assert!(!store.decrement_or_delete(&cart_id, &product.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_unit_dropped_without_commit_rolls_back() {
        let (store, cart_id, product) = store_with_cart().await;
        store.upsert_item(&cart_id, &product.id).await.unwrap();

        {
            let mut unit = store.begin().await.unwrap();
            assert!(unit.take_stock(&product.id, 2).await.unwrap());
            unit.clear_cart(&cart_id).await.unwrap();
        }

        assert_eq!(store.stock_of(&product.id).await, Some(5));
        assert_eq!(store.items(&cart_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unit_commit_applies_writes() {
        let (store, cart_id, product) = store_with_cart().await;
        CouponStore::insert(&store, &Coupon::new("SAVE10", DiscountRate::from_bps(1000)))
            .await
            .unwrap();

        let mut unit = store.begin().await.unwrap();
        assert!(unit.take_stock(&product.id, 5).await.unwrap());
        assert!(!unit.take_stock(&product.id, 1).await.unwrap());
        assert!(unit.coupon("SAVE10").await.unwrap().is_some());
        unit.clear_cart(&cart_id).await.unwrap();
        unit.commit().await.unwrap();

        assert_eq!(store.stock_of(&product.id).await, Some(0));
    }

    #[tokio::test]
    async fn test_delete_product_cascades_out_of_carts() {
        let (store, cart_id, product) = store_with_cart().await;
        store.upsert_item(&cart_id, &product.id).await.unwrap();

        ProductStore::delete(&store, &product.id).await.unwrap();
        assert!(store.items(&cart_id).await.unwrap().is_empty());
        assert!(matches!(
            ProductStore::delete(&store, &product.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let (store, _, _) = store_with_cart().await;
        let dup = User::new("Ada Two", "ada@example.com", "hash", UserRole::Customer);
        let cart = Cart::for_user(&dup.id);
        assert!(matches!(
            store.create_with_cart(&dup, &cart).await,
            Err(StoreError::Conflict(_))
        ));
        assert!(store.cart_id_for_user(&dup.id).await.unwrap().is_none());
    }
}
