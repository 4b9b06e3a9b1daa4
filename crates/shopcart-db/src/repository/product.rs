//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Case-insensitive name search
//!
//! ## Name Search
//! ```text
//! User types: "mug"
//!      │
//!      ▼
//! WHERE name LIKE '%mug%' ESCAPE '\'   (ASCII case-insensitive in SQLite)
//!      │
//!      ▼
//! Results ordered by name
//! ```
//!
//! `%` and `_` typed by the user are escaped so they match literally.

use async_trait::async_trait;
use chrono::Utc;
use shopcart_core::Product;
use shopcart_engine::{ProductStore, StoreResult};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, name, price, stock, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let results = repo.search_by_name("mug").await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists all products sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Searches products whose name contains `query`.
    ///
    /// ## Arguments
    /// * `query` - Substring to look for (case-insensitive for ASCII)
    pub async fn search_by_name(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = query.trim();
        debug!(query = %query, "Searching products");

        let pattern = format!("%{}%", escape_like(query));
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name LIKE ?1 ESCAPE '\\' \
             ORDER BY name, id"
        ))
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - id already exists
    /// * `Err(DbError::CheckViolation)` - negative price or stock
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (id, name, price, stock, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates name, price and stock of an existing product.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                price = ?3,
                stock = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Deletes a product. Cart lines referencing it go with it (ON DELETE CASCADE).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts products (for diagnostics and the seed binary).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn get_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(ProductRepository::get_by_id(self, id).await?)
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(ProductRepository::list(self).await?)
    }

    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Product>> {
        Ok(ProductRepository::search_by_name(self, query).await?)
    }

    async fn insert(&self, product: &Product) -> StoreResult<()> {
        Ok(ProductRepository::insert(self, product).await?)
    }

    async fn update(&self, product: &Product) -> StoreResult<()> {
        Ok(ProductRepository::update(self, product).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        Ok(ProductRepository::delete(self, id).await?)
    }
}
