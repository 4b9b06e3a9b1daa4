//! Registration and login.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use shopcart_core::User;
use tracing::info;

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
    pub user: User,
}

/// `POST /register` - creates a customer account and its cart.
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiResponse<User>, ApiError> {
    let Json(req) = payload?;
    let user = state
        .accounts
        .register(&req.name, &req.email, &req.password)
        .await?;
    Ok(ApiResponse::created("User registered successfully", user))
}

/// `POST /login` - exchanges credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiResponse<LoginResponse>, ApiError> {
    let Json(req) = payload?;
    let user = state
        .accounts
        .authenticate(&req.email, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("invalid email or password".to_string()))?;

    let token = state.jwt.generate_token(&user)?;
    info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(ApiResponse::ok(
        "Login successful",
        LoginResponse {
            token,
            token_type: "Bearer",
            expires_in: state.jwt.lifetime_secs(),
            user,
        },
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::routes::test_support::{TestApp, PASSWORD};

    #[tokio::test]
    async fn test_register_then_login() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({ "name": "Ada", "email": "Ada@Example.com", "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["email"], "ada@example.com");
        assert_eq!(body["data"]["role"], "customer");
        assert!(body["data"].get("password_hash").is_none());

        let token = app.login("ada@example.com").await;
        let claims = app.state.jwt.validate_token(&token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let app = TestApp::new().await;
        app.customer_token("ada@example.com").await;

        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({ "name": "Ada", "email": "ada@example.com", "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let app = TestApp::new().await;
        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({ "name": "Ada", "email": "ada@example.com", "password": "short" })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], 400);
    }

    #[tokio::test]
    async fn test_wrong_password_unauthorized() {
        let app = TestApp::new().await;
        app.customer_token("ada@example.com").await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "email": "ada@example.com", "password": "Wr0ng!pass" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let app = TestApp::new().await;
        let (status, _) = app
            .send(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "email": "ada@example.com" })),
            )
            .await;
        // axum's own rejection would be 422
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
