// handlers/public/auth/login.rs - POST /api/auth/login handler

use axum::Json;
use serde::Deserialize;

use crate::auth::verify_password;
use crate::database::service;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::TokenResponse;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/**
 * POST /api/auth/login - Authenticate with email + password
 *
 * Returns a bearer token and the caller's role. Unknown email, wrong password and
 * deactivated accounts all answer with the same 401.
 */
pub async fn login_post(Json(body): Json<LoginRequest>) -> ApiResult<TokenResponse> {
    let email = body.email.trim().to_lowercase();
    if email.is_empty() || body.password.is_empty() {
        return Err(ApiError::validation_error("Email and password are required", None));
    }

    let pool = DatabaseManager::pool().await?;
    let user = service::find_user_by_email(&pool, &email).await?;

    let Some(user) = user.filter(|u| u.is_active) else {
        tracing::warn!("Login failed for {}: no active account", email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    };

    if !verify_password(body.password, user.password_hash.clone()).await? {
        tracing::warn!("Login failed for {}: bad password", email);
        return Err(ApiError::unauthorized("Invalid email or password"));
    }

    tracing::info!("User {} logged in as {}", user.id, user.role);
    Ok(ApiResponse::success(TokenResponse::issue(user)?))
}
