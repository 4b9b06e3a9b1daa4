//! # Engine Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  StoreError   ← what a store backend reports (memory, SQLite)          │
//! │       │                                                                 │
//! │       ▼  wrapped with the operation and entity id                       │
//! │  EngineError::Persistence { operation, id, source }                    │
//! │                                                                         │
//! │  CoreError    ← business outcome (OutOfStock, InvalidCoupon, ...)      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  EngineError::Core                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use shopcart_core::{CoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Failure reported by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The row to update or delete does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A uniqueness or reference constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Anything else the backend could not do.
    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Engine Error
// =============================================================================

/// Error returned by the Cart Engine and the services.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Business outcome; the request was refused.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store call failed.
    #[error("Failed to {operation} ({id}): {source}")]
    Persistence {
        operation: &'static str,
        id: String,
        #[source]
        source: StoreError,
    },

    /// Password hashing failed.
    #[error("Credential hashing failed: {0}")]
    Hashing(String),
}

impl EngineError {
    /// Returns a mapper that wraps a [`StoreError`] with context.
    ///
    /// ```rust,ignore
    /// store.clear(&cart_id).await.map_err(EngineError::persistence("clear cart", &cart_id))?;
    /// ```
    pub fn persistence(
        operation: &'static str,
        id: impl Into<String>,
    ) -> impl FnOnce(StoreError) -> EngineError {
        let id = id.into();
        move |source| EngineError::Persistence {
            operation,
            id,
            source,
        }
    }

    /// The business error, if this is one.
    pub fn as_core(&self) -> Option<&CoreError> {
        match self {
            EngineError::Core(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for EngineError {
    fn from(err: ValidationError) -> Self {
        EngineError::Core(CoreError::Validation(err))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_persistence_error_keeps_context_and_source() {
        let err = EngineError::persistence("clear cart", "cart-1")(StoreError::Backend(
            "disk I/O error".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Failed to clear cart (cart-1): Store backend error: disk I/O error"
        );
        assert!(err.source().is_some());
        assert!(err.as_core().is_none());
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: EngineError = CoreError::EmptyCart {
            cart_id: "c".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Cart c is empty");
        assert!(matches!(err.as_core(), Some(CoreError::EmptyCart { .. })));
    }

    #[test]
    fn test_validation_lifts_into_core() {
        let err: EngineError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(err, EngineError::Core(CoreError::Validation(_))));
    }
}
