//! Cart and checkout endpoints (customers only).
//!
//! ## Coupon Source for Checkout
//! ```text
//! POST /checkout {"coupon_code": "SAVE10"}   ← body wins
//! POST /checkout?coupon=SAVE10                ← query fallback
//! POST /checkout                              ← no coupon
//! ```

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use shopcart_core::{CartSummary, CheckoutReceipt};

use crate::auth::CustomerUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutRequest {
    pub coupon_code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    pub coupon: Option<String>,
}

/// `GET /cart` - lines at current prices plus totals.
pub async fn get_cart(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
) -> Result<ApiResponse<CartSummary>, ApiError> {
    let summary = state.engine.cart_summary(&user.user_id).await?;
    Ok(ApiResponse::ok("Cart items fetched successfully", summary))
}

/// `POST /cart/{product_id}` - adds one unit.
pub async fn add_item(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(product_id): Path<String>,
) -> Result<ApiResponse, ApiError> {
    state.engine.add_to_cart(&user.user_id, &product_id).await?;
    Ok(ApiResponse::message("Product added to cart successfully"))
}

/// `DELETE /cart/{product_id}` - removes one unit.
pub async fn remove_item(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    Path(product_id): Path<String>,
) -> Result<ApiResponse, ApiError> {
    state
        .engine
        .remove_from_cart(&user.user_id, &product_id)
        .await?;
    Ok(ApiResponse::message("Product removed from cart successfully"))
}

/// `POST /checkout`
pub async fn checkout(
    State(state): State<AppState>,
    CustomerUser(user): CustomerUser,
    query: Result<Query<CheckoutQuery>, QueryRejection>,
    body: Bytes,
) -> Result<ApiResponse<CheckoutReceipt>, ApiError> {
    let Query(query) = query?;

    // the body is optional, so it is parsed by hand instead of through Json
    let request: CheckoutRequest = if body.iter().all(u8::is_ascii_whitespace) {
        CheckoutRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("invalid checkout body: {}", e)))?
    };

    let coupon = request.coupon_code.or(query.coupon);
    let receipt = state
        .engine
        .checkout(&user.user_id, coupon.as_deref())
        .await?;
    Ok(ApiResponse::ok("Checkout successful", receipt))
}
