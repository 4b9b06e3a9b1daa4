//! # Error Types
//!
//! Domain-specific error types for shopcart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopcart-core errors (this file)                                      │
//! │  ├── CoreError        - Business outcomes (stock, cart, coupon)        │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopcart-engine errors                                                │
//! │  ├── StoreError       - Store backend failures                         │
//! │  └── EngineError      - CoreError | Persistence { operation, id }      │
//! │                                                                         │
//! │  shopcart-db errors                                                    │
//! │  └── DbError          - sqlx failures, converted into StoreError       │
//! │                                                                         │
//! │  apps/api errors                                                       │
//! │  └── ApiError         - HTTP status + JSON envelope                    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → EngineError → ApiError → client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, cart id, coupon code)
//! 3. Errors are enum variants, never String
//! 4. Business errors are distinct from "not found"

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business outcomes of cart and catalog operations.
///
/// None of these is a system failure: each one means the request was
/// understood and refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A cart, user, product or coupon is missing.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Product has no stock at all.
    #[error("Product {name} ({product_id}) is out of stock")]
    OutOfStock { product_id: String, name: String },

    /// Not enough stock for the requested quantity.
    ///
    /// ## When This Occurs
    /// ```text
    /// add_to_cart (already 3 in cart)
    ///      │
    ///      ▼
    /// Check stock: available=3, requested=4
    ///      │
    ///      ▼
    /// InsufficientStock { product_id, available: 3, requested: 4 }
    /// ```
    /// Also raised by checkout when the live stock no longer covers a line.
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Remove target is not a line item of the cart.
    #[error("Product {product_id} is not in the cart")]
    NotInCart { product_id: String },

    /// Checkout on a cart with no line items.
    #[error("Cart {cart_id} is empty")]
    EmptyCart { cart_id: String },

    /// Unknown coupon code (or the lookup failed).
    #[error("Invalid coupon code: {code}")]
    InvalidCoupon { code: String },

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity would exceed the allowed maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// A line total or subtotal does not fit in the money range.
    #[error("Amount too large: {context}")]
    AmountTooLarge { context: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., email or coupon code already taken).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
