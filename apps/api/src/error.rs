//! Error types for the HTTP API.
//!
//! ## Status Mapping
//! ```text
//! ┌──────────────────────────────────────────┬────────┐
//! │ CoreError::NotFound                      │  404   │
//! │ Validation / CartTooLarge / QtyTooLarge  │  400   │
//! │ AmountTooLarge                           │  400   │
//! │ Validation(Duplicate)                    │  409   │
//! │ OutOfStock / InsufficientStock           │  409   │
//! │ NotInCart / EmptyCart                    │  409   │
//! │ InvalidCoupon                            │  422   │
//! │ Unauthorized / Forbidden                 │ 401/403│
//! │ Persistence / Hashing / Internal         │  500   │
//! └──────────────────────────────────────────┴────────┘
//! ```
//!
//! 500 bodies carry a generic message; the detail goes to the log.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use shopcart_core::{CoreError, ValidationError};
use shopcart_engine::EngineError;

use crate::response::error_body;

/// API errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Authentication failed: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        ApiError::Engine(err.into())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Engine(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn core_status(err: &CoreError) -> StatusCode {
    match err {
        CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        CoreError::Validation(ValidationError::Duplicate { .. }) => StatusCode::CONFLICT,
        CoreError::Validation(_)
        | CoreError::CartTooLarge { .. }
        | CoreError::QuantityTooLarge { .. }
        | CoreError::AmountTooLarge { .. } => StatusCode::BAD_REQUEST,
        CoreError::OutOfStock { .. }
        | CoreError::InsufficientStock { .. }
        | CoreError::NotInCart { .. }
        | CoreError::EmptyCart { .. } => StatusCode::CONFLICT,
        CoreError::InvalidCoupon { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Engine(err) => match err.as_core() {
                Some(core) => core_status(core),
                None => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        error_body(status, message)
    }
}
