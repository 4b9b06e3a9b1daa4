//! JSON response envelope.
//!
//! Every response body, success or error, has the same shape:
//!
//! ```text
//! { "code": 200, "message": "Checkout successful", "data": { ... } }
//! { "code": 409, "message": "Cart c-1 is empty" }
//! ```
//!
//! `code` repeats the HTTP status; `data` is omitted when there is none.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

/// Wire shape of every body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// A successful handler result.
#[derive(Debug)]
pub struct ApiResponse<T = ()> {
    status: StatusCode,
    message: String,
    data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 200 with data.
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: StatusCode::OK,
            message: message.into(),
            data: Some(data),
        }
    }

    /// 201 with data.
    pub fn created(message: impl Into<String>, data: T) -> Self {
        ApiResponse {
            status: StatusCode::CREATED,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// 200 without data.
    pub fn message(message: impl Into<String>) -> Self {
        ApiResponse {
            status: StatusCode::OK,
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            code: self.status.as_u16(),
            message: self.message,
            data: self.data,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Error body: envelope without data.
pub fn error_body(status: StatusCode, message: impl Into<String>) -> Response {
    let body: Envelope<()> = Envelope {
        code: status.as_u16(),
        message: message.into(),
        data: None,
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_omitted_when_absent() {
        let body: Envelope<()> = Envelope {
            code: 200,
            message: "done".to_string(),
            data: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "code": 200, "message": "done" })
        );
    }

    #[test]
    fn test_status_carried_into_response() {
        let response = ApiResponse::created("made", 7).into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = error_body(StatusCode::CONFLICT, "nope");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
