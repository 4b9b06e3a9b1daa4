//! Read-only product browsing.

use std::sync::Arc;

use shopcart_core::validation::validate_search_query;
use shopcart_core::{CoreError, Product};

use crate::error::{EngineError, EngineResult};
use crate::store::ProductStore;

#[derive(Clone)]
pub struct CatalogService {
    products: Arc<dyn ProductStore>,
}

impl CatalogService {
    pub fn new(products: Arc<dyn ProductStore>) -> Self {
        CatalogService { products }
    }

    pub async fn list(&self) -> EngineResult<Vec<Product>> {
        self.products
            .list()
            .await
            .map_err(EngineError::persistence("list products", "*"))
    }

    pub async fn get(&self, id: &str) -> EngineResult<Product> {
        self.products
            .get_by_id(id)
            .await
            .map_err(EngineError::persistence("load product", id))?
            .ok_or_else(|| CoreError::not_found("Product", id).into())
    }

    /// Case-insensitive name search. The query must not be blank.
    pub async fn search(&self, name: &str) -> EngineResult<Vec<Product>> {
        let query = validate_search_query(name)?;
        self.products
            .search_by_name(&query)
            .await
            .map_err(EngineError::persistence("search products", &query))
    }
}
