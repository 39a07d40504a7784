// handlers/protected/auth/me.rs - GET /api/auth/me handler

use axum::Extension;
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Role, User};
use crate::database::service;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Me {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub vendor_id: Option<Uuid>,
    pub user: User,
}

/// GET /api/auth/me - The current principal and its account record
pub async fn me_get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<Me> {
    let pool = DatabaseManager::pool().await?;
    let user = service::find_user(&pool, auth_user.user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

    Ok(ApiResponse::success(Me {
        user_id: auth_user.user_id,
        email: auth_user.email,
        role: auth_user.role,
        vendor_id: auth_user.vendor_id,
        user,
    }))
}
