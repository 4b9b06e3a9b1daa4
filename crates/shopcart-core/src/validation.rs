//! # Validation Module
//!
//! Input validation for the catalog, coupons and accounts.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (axum)                                          │
//! │  └── Type validation (JSON deserialization, path params)               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Services (shopcart-engine)                                   │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! │  ├── UNIQUE (email), PRIMARY KEY (coupon code)                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopcart_core::validation::{validate_coupon_code, validate_email};
//!
//! validate_coupon_code("SAVE10").unwrap();
//! validate_email("ada@example.com").unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::DiscountRate;
use crate::MAX_PRICE_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Characters accepted as the "special" character of a password.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*?";

// =============================================================================
// Account Validators
// =============================================================================

/// Validates a user's display name.
///
/// ## Rules
/// - 2 to 100 characters after trimming
pub fn validate_user_name(name: &str) -> ValidationResult<()> {
    let len = name.trim().chars().count();

    if len == 0 {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if len < 2 {
        return Err(ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        });
    }
    if len > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an email address shape: `local@domain.tld`.
///
/// This is a shape check only; deliverability is not our business.
///
/// ## Example
/// ```rust
/// use shopcart_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("ada@example").is_err());
/// assert!(validate_email("@example.com").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }
    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@domain.tld".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "._%+-".contains(c));
    let (host, tld) = domain.rsplit_once('.').ok_or_else(invalid)?;
    let host_ok = !host.is_empty()
        && !host.starts_with('.')
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');
    let tld_ok = tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic());

    if local_ok && host_ok && tld_ok {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Validates password strength.
///
/// ## Rules
/// - At least 8 characters
/// - At least one letter, one digit and one of `!@#$%^&*?`
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }
    if password.chars().count() < 8 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 8,
        });
    }

    let has_letter = password.chars().any(|c| c.is_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if !(has_letter && has_digit && has_special) {
        return Err(ValidationError::InvalidFormat {
            field: "password".to_string(),
            reason: format!(
                "must contain a letter, a digit and one of {PASSWORD_SPECIAL_CHARS}"
            ),
        });
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ## Example
/// ```rust
/// use shopcart_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Ceramic Mug 350ml").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a price in cents: `0..=MAX_PRICE_CENTS`. Zero is allowed (free items).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed (sold out).
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a product search query.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }
    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Coupon Validators
// =============================================================================

/// Validates a coupon code.
///
/// ## Rules
/// - 3 to 50 characters
/// - Only letters, digits, hyphens and underscores
///
/// ## Example
/// ```rust
/// use shopcart_core::validation::validate_coupon_code;
///
/// assert!(validate_coupon_code("SAVE-10").is_ok());
/// assert!(validate_coupon_code("AB").is_err());
/// assert!(validate_coupon_code("NO SPACES").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }
    if code.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "code".to_string(),
            min: 3,
        });
    }
    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a coupon discount: `0 < rate <= 100%`.
pub fn validate_discount(rate: DiscountRate) -> ValidationResult<()> {
    if !rate.is_valid() {
        return Err(ValidationError::OutOfRange {
            field: "discount_bps".to_string(),
            min: 1,
            max: DiscountRate::MAX_BPS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use shopcart_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
