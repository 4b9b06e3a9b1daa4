//! # Domain Types
//!
//! Core domain types used throughout Shopcart.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Cart       │   │    CartItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──┼─ one per user   │◄──│  cart_id (FK)   │       │
//! │  │  name           │   │  id (UUID)      │   │  product_id(FK) │──┐    │
//! │  │  price (Money)  │   │  user_id (FK)   │   │  quantity > 0   │  │    │
//! │  │  stock >= 0     │   └─────────────────┘   └─────────────────┘  │    │
//! │  └────────▲────────┘                                               │    │
//! │           └────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Coupon      │   │  CartItemView   │   │ CheckoutReceipt │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  code (PK)      │   │  item ⋈ product │   │  lines          │       │
//! │  │  discount (bps) │   │  live price     │   │  subtotal/total │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `CartItemView` and `CheckoutReceipt` are derived and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::money::{DiscountRate, Money};
use crate::pricing;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Current unit price in cents.
    pub price: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Builds a new product with a fresh id and timestamps.
    pub fn new(name: impl Into<String>, price: Money, stock: i64) -> Self {
        let now = Utc::now();
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            price,
            stock,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Whether current stock covers `quantity` units.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// Partial update of a product (admin PUT). `None` leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Money>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.price.is_none() && self.stock.is_none()
    }

    /// Applies the set fields to `product` and bumps `updated_at`.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        product.updated_at = Utc::now();
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A redeemable discount code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Coupon {
    /// Unique code, also the primary key.
    pub code: String,

    /// Percentage off the subtotal, in basis points.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "discount_bps"))]
    #[serde(rename = "discount_bps")]
    pub discount: DiscountRate,
}

impl Coupon {
    pub fn new(code: impl Into<String>, discount: DiscountRate) -> Self {
        Coupon {
            code: code.into(),
            discount,
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// A user's cart. Created once per user and emptied, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

impl Cart {
    pub fn for_user(user_id: impl Into<String>) -> Self {
        Cart {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            created_at: Utc::now(),
        }
    }
}

/// A stored line item. Unique per `(cart_id, product_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItem {
    pub cart_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

/// A cart line joined with the live product row.
///
/// The price is whatever the product costs *now*, not when it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartItemView {
    pub product_id: String,
    pub product_name: String,
    pub price: Money,
    pub quantity: i64,
}

impl CartItemView {
    /// `price × quantity`, or `AmountTooLarge` if it overflows.
    pub fn line_total(&self) -> CoreResult<Money> {
        self.price
            .checked_mul_quantity(self.quantity)
            .ok_or_else(|| CoreError::AmountTooLarge {
                context: format!("line total of product {}", self.product_id),
            })
    }
}

/// Cart contents plus display totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub items: Vec<CartItemView>,
    /// Number of distinct lines.
    pub item_count: usize,
    /// Sum of all line quantities.
    pub total_quantity: i64,
    pub subtotal: Money,
}

impl CartSummary {
    pub fn from_items(items: Vec<CartItemView>) -> CoreResult<Self> {
        let subtotal = pricing::subtotal(&items)?;
        Ok(CartSummary {
            item_count: items.len(),
            total_quantity: items.iter().map(|item| item.quantity).sum(),
            subtotal,
            items,
        })
    }
}

// =============================================================================
// Checkout Receipt
// =============================================================================

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub cart_id: String,
    /// Lines as priced at checkout time.
    pub lines: Vec<CartItemView>,
    pub subtotal: Money,
    pub discount: Money,
    /// Final amount charged: `subtotal - discount`.
    pub total: Money,
    pub coupon_code: Option<String>,
}

// =============================================================================
// Users
// =============================================================================

/// Role carried by a user and embedded in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Manages products and coupons.
    Admin,
    /// Shops: cart and checkout.
    Customer,
}

impl Default for UserRole {
    fn default() -> Self {
        UserRole::Customer
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Customer => "customer",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "customer" => Ok(UserRole::Customer),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// PHC-format password hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Builds a new user with a fresh id.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: UserRole,
    ) -> Self {
        User {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            created_at: Utc::now(),
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn view(id: &str, price: i64, quantity: i64) -> CartItemView {
        CartItemView {
            product_id: id.to_string(),
            product_name: format!("Product {id}"),
            price: Money::from_cents(price),
            quantity,
        }
    }

    #[test]
    fn test_product_stock_checks() {
        let product = Product::new("Mug", Money::from_cents(1299), 3);
        assert!(product.in_stock());
        assert!(product.can_fulfill(3));
        assert!(!product.can_fulfill(4));

        let empty = Product::new("Ghost", Money::from_cents(100), 0);
        assert!(!empty.in_stock());
    }

    #[test]
    fn test_product_update_applies_only_set_fields() {
        let mut product = Product::new("Mug", Money::from_cents(1299), 3);
        let update = ProductUpdate {
            price: Some(Money::from_cents(999)),
            ..Default::default()
        };
        assert!(!update.is_empty());

        update.apply_to(&mut product);
        assert_eq!(product.name, "Mug");
        assert_eq!(product.price.cents(), 999);
        assert_eq!(product.stock, 3);
        assert!(ProductUpdate::default().is_empty());
    }

    #[test]
    fn test_cart_summary_totals() {
        let summary = CartSummary::from_items(vec![view("a", 1000, 2), view("b", 250, 3)]).unwrap();
        assert_eq!(summary.item_count, 2);
        assert_eq!(summary.total_quantity, 5);
        assert_eq!(summary.subtotal.cents(), 2750);
    }

    #[test]
    fn test_user_role_round_trip_str() {
        assert_eq!("admin".parse::<UserRole>(), Ok(UserRole::Admin));
        assert_eq!(UserRole::Customer.to_string(), "customer");
        assert!("root".parse::<UserRole>().is_err());
        assert_eq!(UserRole::default(), UserRole::Customer);
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let user = User::new("Ada", "ada@example.com", "$argon2id$secret", UserRole::Customer);
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "customer");
    }

    #[test]
    fn test_coupon_serializes_discount_bps() {
        let coupon = Coupon::new("SAVE10", DiscountRate::from_bps(1000));
        let json = serde_json::to_value(&coupon).unwrap();
        assert_eq!(json["discount_bps"], 1000);
    }
}
