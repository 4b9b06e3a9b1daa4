//! # Shopcart API
//!
//! HTTP server for the shopping cart backend.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           API Layers                                    │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes/       │  │  auth          │  │  error / response          ││
//! │  │                │  │                │  │                            ││
//! │  │ • users        │  │ • JwtManager   │  │ • ApiError → status        ││
//! │  │ • products     │  │ • Argon2Hasher │  │ • {code, message, data}    ││
//! │  │ • cart         │  │ • AuthUser     │  │                            ││
//! │  │ • admin        │  │ • CustomerUser │  │                            ││
//! │  │                │  │ • AdminUser    │  │                            ││
//! │  └───────┬────────┘  └────────────────┘  └────────────────────────────┘│
//! │          │                                                              │
//! │          ▼                                                              │
//! │  AppState: CartEngine, CatalogService, AdminService, AccountService    │
//! │          │                                                              │
//! │          ▼                                                              │
//! │  shopcart-db (SQLite) or MemoryStore                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `HTTP_PORT` - listen port (default: 8080)
//! - `DATABASE_PATH` - SQLite file (default: ./shopcart.db)
//! - `DB_MAX_CONNECTIONS` - pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_LIFETIME_SECS` - Token lifetime (default: 3600)
//! - `ADMIN_EMAIL` / `ADMIN_PASSWORD` - bootstrap admin account
//! - `RUST_LOG` - log filter

pub mod auth;
pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
