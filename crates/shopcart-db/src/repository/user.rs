//! # User Repository
//!
//! Registration writes the user and its cart in one transaction, so a user
//! without a cart never exists.

use async_trait::async_trait;
use shopcart_core::{Cart, User};
use shopcart_engine::{StoreResult, UserStore};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::cart::insert_cart;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts the user and its cart atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - email already registered
    pub async fn create_with_cart(&self, user: &User, cart: &Cart) -> DbResult<()> {
        debug!(user_id = %user.id, role = %user.role, "Creating user");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| match DbError::from(err) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &user.email),
            other => other,
        })?;

        insert_cart(&mut *tx, cart).await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_with_cart(&self, user: &User, cart: &Cart) -> StoreResult<()> {
        Ok(UserRepository::create_with_cart(self, user, cart).await?)
    }

    async fn get_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(UserRepository::get_by_id(self, id).await?)
    }

    async fn get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(UserRepository::get_by_email(self, email).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopcart_core::UserRole;

    #[tokio::test]
    async fn test_create_and_load_user() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let user = User::new("Root", "root@example.com", "$argon2id$x", UserRole::Admin);
        let cart = Cart::for_user(&user.id);
        users.create_with_cart(&user, &cart).await.unwrap();

        let loaded = users.get_by_email("root@example.com").await.unwrap().unwrap();
        assert_eq!(loaded.id, user.id);
        assert_eq!(loaded.role, UserRole::Admin);
        assert_eq!(loaded.password_hash, "$argon2id$x");
        assert_eq!(
            db.carts().cart_id_for_user(&user.id).await.unwrap(),
            Some(cart.id)
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_leaves_no_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let users = db.users();

        let first = User::new("Ada", "ada@example.com", "h", UserRole::Customer);
        users
            .create_with_cart(&first, &Cart::for_user(&first.id))
            .await
            .unwrap();

        let second = User::new("Ada Two", "ada@example.com", "h", UserRole::Customer);
        let result = users
            .create_with_cart(&second, &Cart::for_user(&second.id))
            .await;
        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
        assert!(users.get_by_id(&second.id).await.unwrap().is_none());
        assert!(db
            .carts()
            .cart_id_for_user(&second.id)
            .await
            .unwrap()
            .is_none());
    }
}
