//! # shopcart-core: Pure Domain Logic for Shopcart
//!
//! This crate contains the domain types and arithmetic of the shopping cart
//! backend as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopcart Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    HTTP API (apps/api)                          │   │
//! │  │    /products  /cart  /checkout  /admin/*                        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               shopcart-engine (Cart Engine)                     │   │
//! │  │    add_to_cart, remove_from_cart, checkout                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shopcart-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ subtotal  │  │   rules   │  │   │
//! │  │   │  Coupon   │  │ Discount  │  │ discount  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Coupon, Cart, CartItemView, User)
//! - [`money`] - Money type with integer arithmetic and [`DiscountRate`]
//! - [`pricing`] - Cart subtotal and coupon application
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Example Usage
//!
//! ```rust
//! use shopcart_core::money::{DiscountRate, Money};
//!
//! let subtotal = Money::from_cents(20_000); // $200.00
//! let rate = DiscountRate::from_percentage(10.0);
//!
//! assert_eq!(subtotal.discount(rate).cents(), 2_000);
//! assert_eq!(subtotal.apply_discount(rate).cents(), 18_000);
//! ```

pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{DiscountRate, Money};
pub use pricing::{CartTotals, PricedCart};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct line items allowed in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Highest accepted product price, in cents ($10,000,000.00).
///
/// Keeps `price × MAX_ITEM_QUANTITY × MAX_CART_ITEMS` far inside i64.
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;

/// Maximum quantity of a single product in one cart.
///
/// Guards against runaway repeated adds; stock is checked separately.
pub const MAX_ITEM_QUANTITY: i64 = 999;
