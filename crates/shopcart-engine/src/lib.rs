//! # shopcart-engine: Cart Engine for Shopcart
//!
//! Cart mutation, checkout and the services around them, written against
//! store capability traits so the same logic runs on SQLite and in memory.
//!
//! ## Module Structure
//! ```text
//! shopcart_engine/
//! ├── store.rs     - ProductStore, CouponStore, CartStore, UserStore, CheckoutStore
//! ├── engine.rs    - CartEngine: cart_items, add_to_cart, remove_from_cart, checkout
//! ├── checkout.rs  - Checkout state machine inside one unit of work
//! ├── catalog.rs   - Product browsing
//! ├── admin.rs     - Product and coupon management
//! ├── accounts.rs  - Registration and authentication
//! ├── memory.rs    - In-memory implementation of every store trait
//! └── error.rs     - StoreError, EngineError
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use shopcart_engine::{CartEngine, MemoryStore};
//!
//! let store = Arc::new(MemoryStore::new());
//! let engine = CartEngine::from_store(store);
//! # let _ = engine;
//! ```

pub mod accounts;
pub mod admin;
pub mod catalog;
pub mod checkout;
pub mod engine;
pub mod error;
pub mod memory;
pub mod store;

pub use accounts::{AccountService, CredentialHasher};
pub use admin::{AdminService, NewProduct};
pub use catalog::CatalogService;
pub use checkout::CheckoutState;
pub use engine::CartEngine;
pub use error::{EngineError, EngineResult, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::{CartStore, CheckoutStore, CheckoutUnit, CouponStore, ProductStore, UserStore};
