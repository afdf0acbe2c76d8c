//! User endpoints
//!
//! Registration, login, logout and the current user's profile.

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::extract::JsonBody;
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::service::AccountService;

/// Registration request
///
/// Fields are optional so a missing field is a 400 with a readable
/// message rather than a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Public view of a user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

fn build_account_service(state: &AppState) -> AccountService {
    AccountService::new(
        state.db.clone(),
        state.sessions.clone(),
        state.config.auth.min_password_length,
    )
}

/// POST /api/users
/// Create a user and return a token for the new session
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let token = build_account_service(&state)
        .register(req.name, req.email, req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(TokenResponse { token })))
}

/// POST /api/users/login
/// Log in; refused while another session is live
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let token = build_account_service(&state)
        .login(req.email, req.password)
        .await?;

    Ok(Json(TokenResponse { token }))
}

/// POST /api/users/logout
/// End the current session
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<MessageResponse>, AppError> {
    build_account_service(&state).logout(&user).await?;

    Ok(Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    }))
}

/// GET /api/users/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    })
}
