//! Public catalog endpoints.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use shopcart_core::Product;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub name: String,
}

/// `GET /products`
pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Product>>, ApiError> {
    let products = state.catalog.list().await?;
    Ok(ApiResponse::ok("Products fetched successfully", products))
}

/// `GET /products/search?name=` - case-insensitive substring match.
pub async fn search(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Result<ApiResponse<Vec<Product>>, ApiError> {
    let Query(query) = query?;
    let products = state.catalog.search(&query.name).await?;
    Ok(ApiResponse::ok("Products fetched successfully", products))
}

/// `GET /products/{id}`
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Product>, ApiError> {
    let product = state.catalog.get(&id).await?;
    Ok(ApiResponse::ok("Product fetched successfully", product))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use crate::routes::test_support::TestApp;

    #[tokio::test]
    async fn test_list_and_get() {
        let app = TestApp::new().await;
        let mug = app.product("Ceramic Mug", 1299, 4).await;
        app.product("Desk Lamp", 4500, 1).await;

        let (status, body) = app.send(Method::GET, "/api/v1/products", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let uri = format!("/api/v1/products/{}", mug.id);
        let (status, body) = app.send(Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Ceramic Mug");
        assert_eq!(body["data"]["price"], 1299);
    }

    #[tokio::test]
    async fn test_unknown_product_is_404() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(Method::GET, "/api/v1/products/nope", None, None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], 404);
    }

    #[tokio::test]
    async fn test_search() {
        let app = TestApp::new().await;
        app.product("Ceramic Mug", 1299, 4).await;
        app.product("Travel MUG", 1599, 4).await;
        app.product("Desk Lamp", 4500, 1).await;

        let (status, body) = app
            .send(Method::GET, "/api/v1/products/search?name=mug", None, None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 2);

        let (status, _) = app
            .send(Method::GET, "/api/v1/products/search", None, None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
