//! # Store Capabilities
//!
//! The engine never sees a connection or a table; it sees these traits.
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────────────────────────────┐
//! │   CartEngine     │─────►│ ProductStore  CouponStore  CartStore     │
//! │   services       │      │ UserStore     CheckoutStore              │
//! └──────────────────┘      └───────────────┬──────────────────────────┘
//!                                           │ implemented by
//!                           ┌───────────────┴───────────────┐
//!                           ▼                               ▼
//!                    MemoryStore (tests)          SqliteStores (shopcart-db)
//! ```
//!
//! Every method reports backend trouble as [`StoreError`]. Absence on a
//! lookup is `Ok(None)`, not an error.

use async_trait::async_trait;
use shopcart_core::{Cart, CartItemView, Coupon, Product, User};

use crate::error::StoreResult;

// =============================================================================
// Catalog
// =============================================================================

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>>;

    /// All products, ordered by name.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    /// Case-insensitive substring match on the name.
    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Product>>;

    async fn insert(&self, product: &Product) -> StoreResult<()>;

    /// Overwrites name, price and stock. `NotFound` if the id is unknown.
    async fn update(&self, product: &Product) -> StoreResult<()>;

    /// Deletes the product and every cart line referencing it.
    async fn delete(&self, id: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait CouponStore: Send + Sync {
    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Coupon>>;

    /// `Conflict` if the code already exists.
    async fn insert(&self, coupon: &Coupon) -> StoreResult<()>;

    async fn delete(&self, code: &str) -> StoreResult<()>;
}

// =============================================================================
// Carts
// =============================================================================

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn create_cart(&self, cart: &Cart) -> StoreResult<()>;

    async fn cart_id_for_user(&self, user_id: &str) -> StoreResult<Option<String>>;

    /// Lines joined with live product data, in insertion order.
    async fn items(&self, cart_id: &str) -> StoreResult<Vec<CartItemView>>;

    /// Current quantity of a product in the cart, 0 if absent.
    async fn item_quantity(&self, cart_id: &str, product_id: &str) -> StoreResult<i64>;

    /// Inserts the line with quantity 1, or increments an existing one.
    async fn upsert_item(&self, cart_id: &str, product_id: &str) -> StoreResult<()>;

    /// Decrements the line by one, deleting it when it reaches zero.
    ///
    /// Returns `false` when there was no such line.
    async fn decrement_or_delete(&self, cart_id: &str, product_id: &str) -> StoreResult<bool>;

    async fn clear(&self, cart_id: &str) -> StoreResult<()>;
}

// =============================================================================
// Users
// =============================================================================

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Stores the user and its cart together; neither exists if this fails.
    ///
    /// `Conflict` if the email is taken.
    async fn create_with_cart(&self, user: &User, cart: &Cart) -> StoreResult<()>;

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<User>>;

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>>;
}

// =============================================================================
// Checkout Unit of Work
// =============================================================================

/// Opens checkout units of work.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Starts a unit holding exclusive write access until commit or drop.
    async fn begin(&self) -> StoreResult<Box<dyn CheckoutUnit>>;
}

/// Reads and writes of one checkout, applied all together on [`commit`].
///
/// Dropping a unit without committing discards every write made through it.
///
/// [`commit`]: CheckoutUnit::commit
#[async_trait]
pub trait CheckoutUnit: Send {
    async fn items(&mut self, cart_id: &str) -> StoreResult<Vec<CartItemView>>;

    async fn product(&mut self, product_id: &str) -> StoreResult<Option<Product>>;

    /// `stock = stock - quantity` only if `stock >= quantity`.
    ///
    /// Returns `false` (and changes nothing) when stock is short.
    async fn take_stock(&mut self, product_id: &str, quantity: i64) -> StoreResult<bool>;

    async fn coupon(&mut self, code: &str) -> StoreResult<Option<Coupon>>;

    async fn clear_cart(&mut self, cart_id: &str) -> StoreResult<()>;

    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
