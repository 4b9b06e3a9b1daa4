//! # Cart Repository
//!
//! Carts and their line items.
//!
//! ## Line Item Upsert
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add "Mug" to cart                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT (cart, mug, 1)                                                 │
//! │  ON CONFLICT (cart_id, product_id) DO UPDATE quantity = quantity + 1   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  One row per (cart, product); added_at keeps the first insert time    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use chrono::Utc;
use shopcart_core::{Cart, CartItemView};
use shopcart_engine::{CartStore, StoreResult};
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

/// Lines of a cart joined with live product rows, oldest first.
pub(crate) async fn fetch_items<'e, E>(executor: E, cart_id: &str) -> DbResult<Vec<CartItemView>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let items = sqlx::query_as::<_, CartItemView>(
        r#"
        SELECT
            ci.product_id AS product_id,
            p.name        AS product_name,
            p.price       AS price,
            ci.quantity   AS quantity
        FROM cart_items ci
        INNER JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = ?1
        ORDER BY ci.added_at, ci.rowid
        "#,
    )
    .bind(cart_id)
    .fetch_all(executor)
    .await?;

    Ok(items)
}

/// Empties a cart.
pub(crate) async fn clear_items<'e, E>(executor: E, cart_id: &str) -> DbResult<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = ?1")
        .bind(cart_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Inserts a cart row.
pub(crate) async fn insert_cart<'e, E>(executor: E, cart: &Cart) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT INTO carts (id, user_id, created_at) VALUES (?1, ?2, ?3)")
        .bind(&cart.id)
        .bind(&cart.user_id)
        .bind(cart.created_at)
        .execute(executor)
        .await?;

    Ok(())
}

#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    pub async fn create(&self, cart: &Cart) -> DbResult<()> {
        debug!(cart_id = %cart.id, user_id = %cart.user_id, "Creating cart");
        insert_cart(&self.pool, cart).await
    }

    pub async fn cart_id_for_user(&self, user_id: &str) -> DbResult<Option<String>> {
        let id: Option<String> = sqlx::query_scalar("SELECT id FROM carts WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    pub async fn items(&self, cart_id: &str) -> DbResult<Vec<CartItemView>> {
        fetch_items(&self.pool, cart_id).await
    }

    pub async fn item_quantity(&self, cart_id: &str, product_id: &str) -> DbResult<i64> {
        let quantity: Option<i64> = sqlx::query_scalar(
            "SELECT quantity FROM cart_items WHERE cart_id = ?1 AND product_id = ?2",
        )
        .bind(cart_id)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(quantity.unwrap_or(0))
    }

    /// Adds one unit, creating the line if needed.
    pub async fn upsert_item(&self, cart_id: &str, product_id: &str) -> DbResult<()> {
        debug!(cart_id = %cart_id, product_id = %product_id, "Upserting cart item");

        sqlx::query(
            r#"
            INSERT INTO cart_items (cart_id, product_id, quantity, added_at)
            VALUES (?1, ?2, 1, ?3)
            ON CONFLICT (cart_id, product_id)
            DO UPDATE SET quantity = quantity + 1
            "#,
        )
        .bind(cart_id)
        .bind(product_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Removes one unit; deletes the line at zero.
    ///
    /// Returns `false` if the line did not exist.
    pub async fn decrement_or_delete(&self, cart_id: &str, product_id: &str) -> DbResult<bool> {
        debug!(cart_id = %cart_id, product_id = %product_id, "Decrementing cart item");

        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query(
            "DELETE FROM cart_items WHERE cart_id = ?1 AND product_id = ?2 AND quantity <= 1",
        )
        .bind(cart_id)
        .bind(product_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let decremented = if deleted == 0 {
            sqlx::query(
                "UPDATE cart_items SET quantity = quantity - 1 WHERE cart_id = ?1 AND product_id = ?2",
            )
            .bind(cart_id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
        } else {
            0
        };

        tx.commit().await?;
        Ok(deleted + decremented > 0)
    }

    pub async fn clear(&self, cart_id: &str) -> DbResult<()> {
        let removed = clear_items(&self.pool, cart_id).await?;
        debug!(cart_id = %cart_id, removed, "Cleared cart");
        Ok(())
    }
}

#[async_trait]
impl CartStore for CartRepository {
    async fn create_cart(&self, cart: &Cart) -> StoreResult<()> {
        Ok(self.create(cart).await?)
    }

    async fn cart_id_for_user(&self, user_id: &str) -> StoreResult<Option<String>> {
        Ok(CartRepository::cart_id_for_user(self, user_id).await?)
    }

    async fn items(&self, cart_id: &str) -> StoreResult<Vec<CartItemView>> {
        Ok(CartRepository::items(self, cart_id).await?)
    }

    async fn item_quantity(&self, cart_id: &str, product_id: &str) -> StoreResult<i64> {
        Ok(CartRepository::item_quantity(self, cart_id, product_id).await?)
    }

    async fn upsert_item(&self, cart_id: &str, product_id: &str) -> StoreResult<()> {
        Ok(CartRepository::upsert_item(self, cart_id, product_id).await?)
    }

    async fn decrement_or_delete(&self, cart_id: &str, product_id: &str) -> StoreResult<bool> {
        Ok(CartRepository::decrement_or_delete(self, cart_id, product_id).await?)
    }

    async fn clear(&self, cart_id: &str) -> StoreResult<()> {
        Ok(CartRepository::clear(self, cart_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::{Database, DbConfig};
    use shopcart_core::{Money, Product, User, UserRole};

    async fn setup() -> (Database, String, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let user = User::new("Ada", "ada@example.com", "hash", UserRole::Customer);
        let cart = Cart::for_user(&user.id);
        db.users().create_with_cart(&user, &cart).await.unwrap();

        let product = Product::new("Mug", Money::from_cents(1299), 5);
        db.products().insert(&product).await.unwrap();
        (db, cart.id, product)
    }

    #[tokio::test]
    async fn test_upsert_twice_is_one_line() {
        let (db, cart_id, product) = setup().await;
        let carts = db.carts();
        carts.upsert_item(&cart_id, &product.id).await.unwrap();
        carts.upsert_item(&cart_id, &product.id).await.unwrap();

        let items = carts.items(&cart_id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(items[0].product_name, "Mug");
        assert_eq!(items[0].price.cents(), 1299);
    }

    #[tokio::test]
    async fn test_decrement_then_delete() {
        let (db, cart_id, product) = setup().await;
        let carts = db.carts();
        carts.upsert_item(&cart_id, &product.id).await.unwrap();
        carts.upsert_item(&cart_id, &product.id).await.unwrap();

        assert!(carts.decrement_or_delete(&cart_id, &product.id).await.unwrap());
        assert_eq!(carts.item_quantity(&cart_id, &product.id).await.unwrap(), 1);

        assert!(carts.decrement_or_delete(&cart_id, &product.id).await.unwrap());
        assert_eq!(carts.item_quantity(&cart_id, &product.id).await.unwrap(), 0);
        assert!(carts.items(&cart_id).await.unwrap().is_empty());

        assert!(!carts.decrement_or_delete(&cart_id, &product.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_item_for_unknown_product_violates_fk() {
        let (db, cart_id, _) = setup().await;
        assert!(matches!(
            db.carts().upsert_item(&cart_id, "no-such-product").await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_deleting_product_removes_lines() {
        let (db, cart_id, product) = setup().await;
        db.carts().upsert_item(&cart_id, &product.id).await.unwrap();
        db.products().delete(&product.id).await.unwrap();
        assert!(db.carts().items(&cart_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_second_cart_for_user_conflicts() {
        let (db, _, _) = setup().await;
        let user_id = db
            .users()
            .get_by_email("ada@example.com")
            .await
            .unwrap()
            .unwrap()
            .id;
        assert!(matches!(
            db.carts().create(&Cart::for_user(user_id)).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }
}
