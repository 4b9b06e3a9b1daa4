//! # shopcart-db: Database Layer for Shopcart
//!
//! SQLite storage for the cart engine, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shopcart Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (POST /api/v1/checkout)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CartEngine::checkout  (shopcart-engine, talks to traits only)         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  shopcart-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │  │   │
//! │  │   │               │    │ ProductRepo    │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CartRepo       │    │ 001_initial_ │  │   │
//! │  │   │ Connection    │    │ CheckoutRepo   │    │   schema.sql │  │   │
//! │  │   │ Management    │    │ ...            │    │              │  │   │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (DATABASE_PATH, default ./shopcart.db)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Store trait implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shopcart_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./shopcart.db")).await?;
//! let products = db.products().search_by_name("mug").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::cart::CartRepository;
pub use repository::checkout::{CheckoutRepository, SqliteCheckoutUnit};
pub use repository::coupon::CouponRepository;
pub use repository::product::ProductRepository;
pub use repository::user::UserRepository;

// =============================================================================
// Engine Over SQLite
// =============================================================================
