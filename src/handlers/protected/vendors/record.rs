// handlers/protected/vendors/record.rs - single vendor handlers

use axum::extract::Path;
use axum::{Extension, Json};
use uuid::Uuid;

use crate::config;
use crate::database::models::{Role, Vendor};
use crate::database::service::{self, NewVendor, VendorChanges};
use crate::database::{repository, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/vendors/:id
pub async fn vendor_get(Extension(_auth_user): Extension<AuthUser>, Path(id): Path<Uuid>) -> ApiResult<Vendor> {
    let pool = DatabaseManager::pool().await?;
    let vendor = repository::find_vendor(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Vendor {id} not found")))?;
    Ok(ApiResponse::success(vendor))
}

/// POST /api/vendors - Names are unique ignoring case; a clash is a 409
pub async fn vendor_post(
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<NewVendor>,
) -> ApiResult<Vendor> {
    auth_user.require_role(&[Role::Admin])?;
    if body.name.trim().is_empty() {
        return Err(ApiError::invalid_field("name", "is required"));
    }

    let pool = DatabaseManager::pool().await?;
    let vendor = service::create_vendor(&pool, &body, &config::config().roster.default_vendor_location).await?;
    tracing::info!("Admin {} created vendor '{}'", auth_user.user_id, vendor.name);
    Ok(ApiResponse::created(vendor))
}

/// PUT /api/vendors/:id - Partial update; `isActive: false` retires a vendor
pub async fn vendor_put(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<VendorChanges>,
) -> ApiResult<Vendor> {
    auth_user.require_role(&[Role::Admin])?;
    if changes.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::invalid_field("name", "must not be blank"));
    }

    let pool = DatabaseManager::pool().await?;
    let vendor = service::update_vendor(&pool, id, &changes).await?;
    Ok(ApiResponse::success(vendor))
}
