//! # Repository Module
//!
//! SQLite repositories, one per store trait of `shopcart-engine`.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CartEngine / services                                                 │
//! │       │                                                                 │
//! │       │  Arc<dyn CartStore>::upsert_item(cart, product)                │
//! │       ▼                                                                 │
//! │  CartRepository (impl CartStore)                                       │
//! │  ├── inherent methods → DbResult<T>   (SQL lives here)                 │
//! │  └── trait methods    → StoreResult<T> (DbError → StoreError)          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and name search
//! - [`CouponRepository`](coupon::CouponRepository) - Coupon lookup and management
//! - [`CartRepository`](cart::CartRepository) - Carts and line items
//! - [`UserRepository`](user::UserRepository) - Users (created together with their cart)
//! - [`CheckoutRepository`](checkout::CheckoutRepository) - Checkout transactions

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod product;
pub mod user;
