//! # Admin Service
//!
//! Inventory management: products and coupons.
//!
//! ```text
//! input ──► validation (shopcart-core) ──► store write ──► info! log
//!                 │                             │
//!                 ▼                             ▼
//!          CoreError::Validation       StoreError::Conflict ──► Duplicate
//!                                      StoreError::NotFound ──► NotFound
//! ```

use std::sync::Arc;

use serde::Deserialize;
use shopcart_core::validation::{
    validate_coupon_code, validate_discount, validate_price_cents, validate_product_name,
    validate_stock,
};
use shopcart_core::{CoreError, Coupon, DiscountRate, Money, Product, ProductUpdate, ValidationError};
use tracing::info;

use crate::error::{EngineError, EngineResult, StoreError};
use crate::store::{CouponStore, ProductStore};

/// Fields of a product to create.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock: i64,
}

#[derive(Clone)]
pub struct AdminService {
    products: Arc<dyn ProductStore>,
    coupons: Arc<dyn CouponStore>,
}

/// Maps a store miss onto the business error, keeping other failures as persistence.
fn lift(
    operation: &'static str,
    entity: &'static str,
    id: &str,
) -> impl FnOnce(StoreError) -> EngineError {
    let id = id.to_string();
    move |err| match err {
        StoreError::NotFound { .. } => CoreError::not_found(entity, id).into(),
        other => EngineError::persistence(operation, id)(other),
    }
}

impl AdminService {
    pub fn new(products: Arc<dyn ProductStore>, coupons: Arc<dyn CouponStore>) -> Self {
        AdminService { products, coupons }
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn create_product(&self, input: NewProduct) -> EngineResult<Product> {
        validate_product_name(&input.name)?;
        validate_price_cents(input.price.cents())?;
        validate_stock(input.stock)?;

        let product = Product::new(input.name.trim(), input.price, input.stock);
        self.products
            .insert(&product)
            .await
            .map_err(EngineError::persistence("insert product", &product.id))?;

        info!(product_id = %product.id, name = %product.name, price = %product.price, stock = product.stock, "product created");
        Ok(product)
    }

    /// Applies a partial update. Unset fields keep their value.
    pub async fn update_product(&self, id: &str, update: ProductUpdate) -> EngineResult<Product> {
        if update.is_empty() {
            return Err(ValidationError::Required {
                field: "name, price or stock".to_string(),
            }
            .into());
        }
        if let Some(name) = &update.name {
            validate_product_name(name)?;
        }
        if let Some(price) = update.price {
            validate_price_cents(price.cents())?;
        }
        if let Some(stock) = update.stock {
            validate_stock(stock)?;
        }

        let mut product = self
            .products
            .get_by_id(id)
            .await
            .map_err(EngineError::persistence("load product", id))?
            .ok_or_else(|| CoreError::not_found("Product", id))?;

        let update = ProductUpdate {
            name: update.name.map(|n| n.trim().to_string()),
            ..update
        };
        update.apply_to(&mut product);

        self.products
            .update(&product)
            .await
            .map_err(lift("update product", "Product", id))?;

        info!(product_id = %product.id, "product updated");
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> EngineResult<()> {
        self.products
            .delete(id)
            .await
            .map_err(lift("delete product", "Product", id))?;
        info!(product_id = %id, "product deleted");
        Ok(())
    }

    // =========================================================================
    // Coupons
    // =========================================================================

    pub async fn create_coupon(&self, code: &str, discount: DiscountRate) -> EngineResult<Coupon> {
        let code = code.trim();
        validate_coupon_code(code)?;
        validate_discount(discount)?;

        let duplicate = || ValidationError::Duplicate {
            field: "code".to_string(),
            value: code.to_string(),
        };

        let existing = self
            .coupons
            .get_by_code(code)
            .await
            .map_err(EngineError::persistence("load coupon", code))?;
        if existing.is_some() {
            return Err(duplicate().into());
        }

        let coupon = Coupon::new(code, discount);
        match self.coupons.insert(&coupon).await {
            Ok(()) => {}
            // lost a race with another insert of the same code
            Err(StoreError::Conflict(_)) => return Err(duplicate().into()),
            Err(err) => return Err(EngineError::persistence("insert coupon", code)(err)),
        }

        info!(code = %coupon.code, discount = %coupon.discount, "coupon created");
        Ok(coupon)
    }

    pub async fn delete_coupon(&self, code: &str) -> EngineResult<()> {
        self.coupons
            .delete(code)
            .await
            .map_err(lift("delete coupon", "Coupon", code))?;
        info!(code = %code, "coupon deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn admin() -> (Arc<MemoryStore>, AdminService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), AdminService::new(store.clone(), store))
    }

    fn new_product(name: &str, price: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: Money::from_cents(price),
            stock,
        }
    }

    #[tokio::test]
    async fn test_create_product_trims_and_stores() {
        let (store, admin) = admin();
        let product = admin.create_product(new_product("  Mug  ", 1299, 4)).await.unwrap();
        assert_eq!(product.name, "Mug");
        assert_eq!(store.stock_of(&product.id).await, Some(4));
    }

    #[tokio::test]
    async fn test_create_product_rejects_negative_stock() {
        let (_, admin) = admin();
        let err = admin.create_product(new_product("Mug", 1299, -1)).await.unwrap_err();
        assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let (_, admin) = admin();
        let product = admin.create_product(new_product("Mug", 1299, 4)).await.unwrap();

        let updated = admin
            .update_product(
                &product.id,
                ProductUpdate {
                    stock: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Mug");
        assert_eq!(updated.price.cents(), 1299);
        assert_eq!(updated.stock, 10);
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_product() {
        let (_, admin) = admin();
        let update = ProductUpdate {
            stock: Some(1),
            ..Default::default()
        };
        assert!(matches!(
            admin.update_product("nope", update).await.unwrap_err(),
            EngineError::Core(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            admin.delete_product("nope").await.unwrap_err(),
            EngineError::Core(CoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let (_, admin) = admin();
        let product = admin.create_product(new_product("Mug", 1299, 4)).await.unwrap();
        assert!(admin
            .update_product(&product.id, ProductUpdate::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_duplicate_coupon_is_rejected() {
        let (_, admin) = admin();
        admin
            .create_coupon("SAVE10", DiscountRate::from_bps(1000))
            .await
            .unwrap();
        let err = admin
            .create_coupon("SAVE10", DiscountRate::from_bps(500))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_coupon_discount_bounds() {
        let (_, admin) = admin();
        assert!(admin.create_coupon("ZERO", DiscountRate::from_bps(0)).await.is_err());
        assert!(admin.create_coupon("OVER", DiscountRate::from_bps(10_001)).await.is_err());
        assert!(admin.create_coupon("FREE", DiscountRate::from_bps(10_000)).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_coupon() {
        let (_, admin) = admin();
        admin
            .create_coupon("SAVE10", DiscountRate::from_bps(1000))
            .await
            .unwrap();
        admin.delete_coupon("SAVE10").await.unwrap();
        assert!(matches!(
            admin.delete_coupon("SAVE10").await.unwrap_err(),
            EngineError::Core(CoreError::NotFound { .. })
        ));
    }
}
