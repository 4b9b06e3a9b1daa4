//! # HTTP Routes
//!
//! ```text
//! /api/v1
//! ├── GET    /health
//! ├── POST   /register                      (public)
//! ├── POST   /login                         (public)
//! ├── GET    /products                      (public)
//! ├── GET    /products/search?name=         (public)
//! ├── GET    /products/{id}                 (public)
//! ├── GET    /cart                          (customer)
//! ├── POST   /cart/{product_id}             (customer)
//! ├── DELETE /cart/{product_id}             (customer)
//! ├── POST   /checkout                      (customer)
//! ├── POST   /admin/products                (admin)
//! ├── PUT    /admin/products/{id}           (admin)
//! ├── DELETE /admin/products/{id}           (admin)
//! ├── POST   /admin/coupons                 (admin)
//! └── DELETE /admin/coupons/{code}          (admin)
//! ```
//!
//! Roles are enforced by the handler extractors
//! ([`CustomerUser`](crate::auth::CustomerUser), [`AdminUser`](crate::auth::AdminUser)).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::Router;
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::response::{error_body, ApiResponse};
use crate::state::AppState;

pub mod admin;
pub mod cart;
pub mod products;
pub mod users;

/// Path prefix of every endpoint.
pub const API_PREFIX: &str = "/api/v1";

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/register", post(users::register))
        .route("/login", post(users::login))
        .route("/products", get(products::list))
        .route("/products/search", get(products::search))
        .route("/products/{id}", get(products::get))
        .route("/cart", get(cart::get_cart))
        .route(
            "/cart/{product_id}",
            post(cart::add_item).delete(cart::remove_item),
        )
        .route("/checkout", post(cart::checkout))
        .route("/admin/products", post(admin::create_product))
        .route(
            "/admin/products/{id}",
            put(admin::update_product).delete(admin::delete_product),
        )
        .route("/admin/coupons", post(admin::create_coupon))
        .route("/admin/coupons/{code}", delete(admin::delete_coupon));

    Router::new()
        .nest(API_PREFIX, api)
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    if state.is_healthy().await {
        ApiResponse::ok("OK", json!({ "database": "up" })).into_response()
    } else {
        error_body(StatusCode::SERVICE_UNAVAILABLE, "database unavailable")
    }
}

async fn not_found() -> impl IntoResponse {
    error_body(StatusCode::NOT_FOUND, "route not found")
}

// =============================================================================
// Router Tests
// =============================================================================
