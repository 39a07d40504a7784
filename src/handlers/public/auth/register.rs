// handlers/public/auth/register.rs - POST /api/auth/register handler

use axum::Json;
use serde::Deserialize;

use crate::auth::hash_password;
use crate::config;
use crate::database::models::student::is_institutional_email;
use crate::database::models::Role;
use crate::database::service::{self, NewUser};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

use super::TokenResponse;

pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Shared by self-registration and admin user creation
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::invalid_field(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

/**
 * POST /api/auth/register - Student self-registration
 *
 * The role is always `student`, whatever the body says. The email must belong to the
 * institution's domain. The student's registry entry (vendor, QR token) still comes from
 * the roster; until then `GET /api/students/my-qr-code` answers NO_STUDENT_RECORD.
 */
pub async fn register_post(Json(body): Json<RegisterRequest>) -> ApiResult<TokenResponse> {
    let config = config::config();
    if !config.security.allow_self_registration {
        return Err(ApiError::forbidden("Self-registration is disabled"));
    }

    let name = body.name.trim();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "is required"));
    }
    let domain = &config.institution.email_domain;
    if !is_institutional_email(&body.email, domain) {
        return Err(ApiError::invalid_field("email", format!("must be an @{domain} address")));
    }
    validate_password(&body.password)?;

    let pool = DatabaseManager::pool().await?;
    let user = service::insert_user(
        &pool,
        &NewUser {
            name: name.to_string(),
            email: body.email.clone(),
            password_hash: hash_password(body.password).await?,
            role: Role::Student,
            vendor_id: None,
        },
    )
    .await?;

    tracing::info!("Student {} self-registered", user.id);
    Ok(ApiResponse::created(TokenResponse::issue(user)?))
}
