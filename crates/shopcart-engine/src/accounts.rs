//! # Account Service
//!
//! Registration and credential checks.
//!
//! ## Registration Flow
//! ```text
//! register(name, email, password)
//!      │
//!      ├── validate name / email / password
//!      ├── email taken? ──► Duplicate
//!      ├── hash password (CredentialHasher)
//!      └── create user + cart together (UserStore::create_with_cart)
//! ```
//!
//! Hashing is injected so the engine stays free of crypto crates.

use std::sync::Arc;

use shopcart_core::validation::{validate_email, validate_password, validate_user_name};
use shopcart_core::{Cart, CoreError, User, UserRole, ValidationError};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult, StoreError};
use crate::store::UserStore;

/// One-way password hashing.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, String>;

    fn verify(&self, password: &str, hash: &str) -> bool;
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        AccountService { users, hasher }
    }

    /// Registers a customer and creates their cart.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> EngineResult<User> {
        self.create(name, email, password, UserRole::Customer).await
    }

    /// Creates the admin account unless the email is already registered.
    ///
    /// Returns `true` when a new admin was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> EngineResult<bool> {
        let email = normalize_email(email);
        if self.find_by_email(&email).await?.is_some() {
            return Ok(false);
        }
        self.create("Administrator", &email, password, UserRole::Admin)
            .await?;
        Ok(true)
    }

    /// Returns the user when the credentials match, `None` otherwise.
    ///
    /// Unknown email and wrong password are indistinguishable to callers.
    pub async fn authenticate(&self, email: &str, password: &str) -> EngineResult<Option<User>> {
        let email = normalize_email(email);
        let Some(user) = self.find_by_email(&email).await? else {
            warn!(email = %email, "login for unknown email");
            return Ok(None);
        };

        if self.hasher.verify(password, &user.password_hash) {
            Ok(Some(user))
        } else {
            warn!(user_id = %user.id, "login with wrong password");
            Ok(None)
        }
    }

    pub async fn get(&self, id: &str) -> EngineResult<User> {
        self.users
            .get_by_id(id)
            .await
            .map_err(EngineError::persistence("load user", id))?
            .ok_or_else(|| CoreError::not_found("User", id).into())
    }

    async fn find_by_email(&self, email: &str) -> EngineResult<Option<User>> {
        self.users
            .get_by_email(email)
            .await
            .map_err(EngineError::persistence("load user", email))
    }

    async fn create(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> EngineResult<User> {
        let name = name.trim();
        let email = normalize_email(email);
        validate_user_name(name)?;
        validate_email(&email)?;
        validate_password(password)?;

        let duplicate = || ValidationError::Duplicate {
            field: "email".to_string(),
            value: email.clone(),
        };

        if self.find_by_email(&email).await?.is_some() {
            return Err(duplicate().into());
        }

        let hash = self.hasher.hash(password).map_err(EngineError::Hashing)?;
        let user = User::new(name, email.clone(), hash, role);
        let cart = Cart::for_user(&user.id);

        match self.users.create_with_cart(&user, &cart).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(duplicate().into()),
            Err(err) => return Err(EngineError::persistence("create user", &user.id)(err)),
        }

        info!(user_id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }
}

/// Emails are compared case-insensitively.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::CartStore;

    /// Reversible stand-in for a real hasher.
    struct PlainHasher;

    impl CredentialHasher for PlainHasher {
        fn hash(&self, password: &str) -> Result<String, String> {
            Ok(format!("plain:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> bool {
            hash == format!("plain:{password}")
        }
    }

    fn accounts() -> (Arc<MemoryStore>, AccountService) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), AccountService::new(store, Arc::new(PlainHasher)))
    }

    #[tokio::test]
    async fn test_register_creates_user_and_cart() {
        let (store, accounts) = accounts();
        let user = accounts
            .register("Ada Lovelace", "Ada@Example.com", "engine#1843")
            .await
            .unwrap();

        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, UserRole::Customer);
        assert_ne!(user.password_hash, "engine#1843");
        assert!(store.cart_id_for_user(&user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let (_, accounts) = accounts();
        accounts
            .register("Ada", "ada@example.com", "engine#1843")
            .await
            .unwrap();
        let err = accounts
            .register("Imposter", "ADA@example.com", "engine#1843")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Core(CoreError::Validation(ValidationError::Duplicate { .. }))
        ));
    }

    #[tokio::test]
    async fn test_register_validates_password() {
        let (_, accounts) = accounts();
        assert!(accounts
            .register("Ada", "ada@example.com", "password")
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (_, accounts) = accounts();
        let user = accounts
            .register("Ada", "ada@example.com", "engine#1843")
            .await
            .unwrap();

        let found = accounts
            .authenticate(" ada@example.com ", "engine#1843")
            .await
            .unwrap();
        assert_eq!(found.map(|u| u.id), Some(user.id));
        assert!(accounts
            .authenticate("ada@example.com", "wrong#123")
            .await
            .unwrap()
            .is_none());
        assert!(accounts
            .authenticate("nobody@example.com", "engine#1843")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_ensure_admin_is_idempotent() {
        let (_, accounts) = accounts();
        assert!(accounts.ensure_admin("root@example.com", "admin#2024").await.unwrap());
        assert!(!accounts.ensure_admin("root@example.com", "admin#2024").await.unwrap());

        let admin = accounts
            .authenticate("root@example.com", "admin#2024")
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_admin());
    }
}
