//! Shared application state.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ AppState (Clone, one per router)                              │
//! │                                                               │
//! │  engine   ── CartEngine      ─┐                               │
//! │  catalog  ── CatalogService   │  all built over the same      │
//! │  admin    ── AdminService     ├─ backend: SQLite Database or  │
//! │  accounts ── AccountService  ─┘  MemoryStore (tests)          │
//! │  jwt      ── JwtManager                                       │
//! │  database ── Option<Database> (health check)                  │
//! └───────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use shopcart_db::Database;
use shopcart_engine::{
    AccountService, AdminService, CartEngine, CatalogService, CredentialHasher, MemoryStore,
};

use crate::auth::JwtManager;

#[derive(Clone)]
pub struct AppState {
    pub engine: CartEngine,
    pub catalog: CatalogService,
    pub admin: AdminService,
    pub accounts: AccountService,
    pub jwt: Arc<JwtManager>,
    pub database: Option<Database>,
}

impl AppState {
    /// State backed by SQLite.
    pub fn from_database(
        db: Database,
        jwt: JwtManager,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        let products = Arc::new(db.products());
        let coupons = Arc::new(db.coupons());

        AppState {
            engine: CartEngine::new(
                products.clone(),
                Arc::new(db.carts()),
                Arc::new(db.checkout()),
            ),
            catalog: CatalogService::new(products.clone()),
            admin: AdminService::new(products, coupons),
            accounts: AccountService::new(Arc::new(db.users()), hasher),
            jwt: Arc::new(jwt),
            database: Some(db),
        }
    }

    /// State backed by an in-memory store.
    pub fn in_memory(
        store: MemoryStore,
        jwt: JwtManager,
        hasher: Arc<dyn CredentialHasher>,
    ) -> Self {
        let store = Arc::new(store);

        AppState {
            engine: CartEngine::from_store(store.clone()),
            catalog: CatalogService::new(store.clone()),
            admin: AdminService::new(store.clone(), store.clone()),
            accounts: AccountService::new(store, hasher),
            jwt: Arc::new(jwt),
            database: None,
        }
    }

    /// `true` when the backing store answers.
    pub async fn is_healthy(&self) -> bool {
        match &self.database {
            Some(db) => db.health_check().await,
            None => true,
        }
    }
}
