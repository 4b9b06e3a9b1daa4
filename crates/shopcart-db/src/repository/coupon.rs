//! # Coupon Repository
//!
//! Coupons are keyed by their code; the discount is stored in basis points.

use async_trait::async_trait;
use shopcart_core::Coupon;
use shopcart_engine::{CouponStore, StoreResult};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let coupon = sqlx::query_as::<_, Coupon>(
            "SELECT code, discount_bps FROM coupons WHERE code = ?1",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(coupon)
    }

    /// Inserts a coupon.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - code already exists
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        debug!(code = %coupon.code, discount = %coupon.discount, "Inserting coupon");

        sqlx::query("INSERT INTO coupons (code, discount_bps) VALUES (?1, ?2)")
            .bind(&coupon.code)
            .bind(coupon.discount)
            .execute(&self.pool)
            .await
            .map_err(|err| match DbError::from(err) {
                DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &coupon.code),
                other => other,
            })?;

        Ok(())
    }

    pub async fn delete(&self, code: &str) -> DbResult<()> {
        debug!(code = %code, "Deleting coupon");

        let result = sqlx::query("DELETE FROM coupons WHERE code = ?1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", code));
        }

        Ok(())
    }
}

#[async_trait]
impl CouponStore for CouponRepository {
    async fn get_by_code(&self, code: &str) -> StoreResult<Option<Coupon>> {
        Ok(CouponRepository::get_by_code(self, code).await?)
    }

    async fn insert(&self, coupon: &Coupon) -> StoreResult<()> {
        Ok(CouponRepository::insert(self, coupon).await?)
    }

    async fn delete(&self, code: &str) -> StoreResult<()> {
        Ok(CouponRepository::delete(self, code).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use shopcart_core::DiscountRate;

    #[tokio::test]
    async fn test_coupon_lifecycle() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.coupons();

        let coupon = Coupon::new("SAVE10", DiscountRate::from_bps(1000));
        repo.insert(&coupon).await.unwrap();
        assert_eq!(repo.get_by_code("SAVE10").await.unwrap(), Some(coupon.clone()));

        assert!(matches!(
            repo.insert(&coupon).await,
            Err(DbError::UniqueViolation { ref value, .. }) if value == "SAVE10"
        ));

        repo.delete("SAVE10").await.unwrap();
        assert!(repo.get_by_code("SAVE10").await.unwrap().is_none());
        assert!(matches!(
            repo.delete("SAVE10").await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_codes_are_case_sensitive() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.coupons();
        repo.insert(&Coupon::new("SAVE10", DiscountRate::from_bps(1000)))
            .await
            .unwrap();
        assert!(repo.get_by_code("save10").await.unwrap().is_none());
    }
}
