//! # Checkout Transaction
//!
//! SQLite unit of work for checkout.
//!
//! ## Why BEGIN IMMEDIATE
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Two checkouts for the last unit, both in WAL mode:                    │
//! │                                                                         │
//! │  BEGIN (deferred)             BEGIN IMMEDIATE                           │
//! │  A reads stock=1              A takes the write lock up front           │
//! │  B reads stock=1              B waits (busy_timeout)                    │
//! │  A writes → ok                A: stock 1 → 0, commit                    │
//! │  B writes → SQLITE_BUSY       B: begins, sees stock=0                   │
//! │                                  → InsufficientStock                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On top of that the decrement is conditional
//! (`UPDATE … SET stock = stock - ?q WHERE id = ? AND stock >= ?q`) and
//! its `rows_affected` is the verdict.

use async_trait::async_trait;
use chrono::Utc;
use shopcart_core::{CartItemView, Coupon, Product};
use shopcart_engine::{CheckoutStore, CheckoutUnit, StoreResult};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::cart::{clear_items, fetch_items};

/// Opens checkout transactions.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    pool: SqlitePool,
}

impl CheckoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutRepository { pool }
    }

    /// Starts a write transaction holding the database write lock.
    pub async fn begin(&self) -> DbResult<SqliteCheckoutUnit> {
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Checkout transaction started");
        Ok(SqliteCheckoutUnit { tx })
    }
}

/// One checkout transaction. Dropping it without [`commit`] rolls back.
///
/// [`commit`]: SqliteCheckoutUnit::commit
pub struct SqliteCheckoutUnit {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteCheckoutUnit {
    pub async fn items(&mut self, cart_id: &str) -> DbResult<Vec<CartItemView>> {
        fetch_items(&mut *self.tx, cart_id).await
    }

    pub async fn product(&mut self, product_id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT id, name, price, stock, created_at, updated_at FROM products WHERE id = ?1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(product)
    }

    /// Conditional decrement. `false` means stock was short and nothing changed.
    pub async fn take_stock(&mut self, product_id: &str, quantity: i64) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await?;

        let taken = result.rows_affected() == 1;
        debug!(product_id = %product_id, quantity, taken, "Stock decrement");
        Ok(taken)
    }

    pub async fn coupon(&mut self, code: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "SELECT code, discount_bps FROM coupons WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(coupon)
    }

    pub async fn clear_cart(&mut self, cart_id: &str) -> DbResult<()> {
        clear_items(&mut *self.tx, cart_id).await?;
        Ok(())
    }

    pub async fn commit(self) -> DbResult<()> {
        self.tx
            .commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;
        debug!("Checkout transaction committed");
        Ok(())
    }
}

#[async_trait]
impl CheckoutStore for CheckoutRepository {
    async fn begin(&self) -> StoreResult<Box<dyn CheckoutUnit>> {
        let unit = CheckoutRepository::begin(self).await?;
        Ok(Box::new(unit))
    }
}

#[async_trait]
impl CheckoutUnit for SqliteCheckoutUnit {
    async fn items(&mut self, cart_id: &str) -> StoreResult<Vec<CartItemView>> {
        Ok(SqliteCheckoutUnit::items(self, cart_id).await?)
    }

    async fn product(&mut self, product_id: &str) -> StoreResult<Option<Product>> {
        Ok(SqliteCheckoutUnit::product(self, product_id).await?)
    }

    async fn take_stock(&mut self, product_id: &str, quantity: i64) -> StoreResult<bool> {
        Ok(SqliteCheckoutUnit::take_stock(self, product_id, quantity).await?)
    }

    async fn coupon(&mut self, code: &str) -> StoreResult<Option<Coupon>> {
        Ok(SqliteCheckoutUnit::coupon(self, code).await?)
    }

    async fn clear_cart(&mut self, cart_id: &str) -> StoreResult<()> {
        Ok(SqliteCheckoutUnit::clear_cart(self, cart_id).await?)
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        Ok(SqliteCheckoutUnit::commit(*self).await?)
    }
}
