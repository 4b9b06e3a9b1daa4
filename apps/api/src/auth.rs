//! JWT authentication module.
//!
//! Handles token generation and validation, password hashing, and the
//! request extractors that turn a bearer token into a caller identity.
//!
//! ## Request Authentication
//! ```text
//! Authorization: Bearer <jwt>
//!      │
//!      ▼
//! AuthUser::from_request_parts
//!      ├── header missing / not Bearer ──► 401
//!      ├── bad signature / expired     ──► 401
//!      └── Claims { sub, email, role } ──► AuthUser
//!                │
//!                ├── CustomerUser: role == customer, else 403
//!                └── AdminUser:    role == admin,    else 403
//! ```

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use shopcart_core::{User, UserRole};
use shopcart_engine::CredentialHasher;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    pub email: String,

    pub role: UserRole,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager (HS256).
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime_secs: i64,
}

impl JwtManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Token lifetime in seconds.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime_secs
    }

    /// Issues a token for `user`.
    pub fn generate_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ApiError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> =
            decode(token, &self.decoding_key, &Validation::default())
                .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Argon2id password hashes in PHC string format.
#[derive(Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new(argon2: Argon2<'static>) -> Self {
        Argon2Hasher { argon2 }
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| format!("Failed to hash password: {}", e))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

// =============================================================================
// Extractors
// =============================================================================

/// Any authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing authorization header".to_string()))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::Unauthorized("expected a bearer token".to_string()))?;

        let claims = state.jwt.validate_token(token)?;
        Ok(AuthUser {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// A caller with the customer role. Carts and checkout belong to customers.
#[derive(Debug, Clone)]
pub struct CustomerUser(pub AuthUser);

impl FromRequestParts<AppState> for CustomerUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Customer {
            return Err(ApiError::Forbidden("customers only".to_string()));
        }
        Ok(CustomerUser(user))
    }
}

/// A caller with the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != UserRole::Admin {
            return Err(ApiError::Forbidden("admin only".to_string()));
        }
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
pub(crate) fn fast_hasher() -> Argon2Hasher {
    use argon2::{Algorithm, Params, Version};

    // minimum cost; debug builds are slow enough already
    let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();
    Argon2Hasher::new(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> User {
        User::new("Ada", "ada@example.com", "hash", role)
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 3600);
        let user = user(UserRole::Admin);

        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtManager::new("secret-a", 3600)
            .generate_token(&user(UserRole::Customer))
            .unwrap();

        let result = JwtManager::new("secret-b", 3600).validate_token(&token);
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        // well past the default 60s leeway
        let manager = JwtManager::new("test-secret", -600);
        let token = manager.generate_token(&user(UserRole::Customer)).unwrap();
        assert!(manager.validate_token(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("Str0ng!pass").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("Str0ng!pass", &hash));
        assert!(!hasher.verify("wrong", &hash));
        assert!(!hasher.verify("Str0ng!pass", "not-a-phc-string"));
    }
}
