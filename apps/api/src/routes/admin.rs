//! Admin endpoints: product and coupon management.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use shopcart_core::{Coupon, DiscountRate, Product, ProductUpdate};
use shopcart_engine::NewProduct;

use crate::auth::AdminUser;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct NewCoupon {
    pub code: String,
    pub discount_bps: u32,
}

/// `POST /admin/products` - `{name, price (cents), stock}`.
pub async fn create_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<ApiResponse<Product>, ApiError> {
    let Json(input) = payload?;
    let product = state.admin.create_product(input).await?;
    Ok(ApiResponse::created("Product added successfully", product))
}

/// `PUT /admin/products/{id}` - any subset of `{name, price, stock}`.
pub async fn update_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
    payload: Result<Json<ProductUpdate>, JsonRejection>,
) -> Result<ApiResponse<Product>, ApiError> {
    let Json(update) = payload?;
    let product = state.admin.update_product(&id, update).await?;
    Ok(ApiResponse::ok("Product updated successfully", product))
}

/// `DELETE /admin/products/{id}` - also drops the product from every cart.
pub async fn delete_product(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
) -> Result<ApiResponse, ApiError> {
    state.admin.delete_product(&id).await?;
    Ok(ApiResponse::message("Product removed successfully"))
}

/// `POST /admin/coupons` - `{code, discount_bps}`.
pub async fn create_coupon(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    payload: Result<Json<NewCoupon>, JsonRejection>,
) -> Result<ApiResponse<Coupon>, ApiError> {
    let Json(input) = payload?;
    let coupon = state
        .admin
        .create_coupon(&input.code, DiscountRate::from_bps(input.discount_bps))
        .await?;
    Ok(ApiResponse::created("Coupon added successfully", coupon))
}

/// `DELETE /admin/coupons/{code}`
pub async fn delete_coupon(
    State(state): State<AppState>,
    AdminUser(_): AdminUser,
    Path(code): Path<String>,
) -> Result<ApiResponse, ApiError> {
    state.admin.delete_coupon(&code).await?;
    Ok(ApiResponse::message("Coupon removed successfully"))
}
