// handlers/protected/vendors/dashboard.rs - GET /api/vendors/:id/dashboard handler

use axum::extract::Path;
use axum::Extension;
use uuid::Uuid;

use crate::database::reports::{self, VendorDashboard};
use crate::database::{repository, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::verification::ClaimWindow;

/// GET /api/vendors/:id/dashboard - Today's counts and most recent claims
pub async fn vendor_dashboard_get(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<VendorDashboard> {
    auth_user.require_vendor_access(id)?;

    let pool = DatabaseManager::pool().await?;
    let vendor = repository::find_vendor(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Vendor {id} not found")))?;

    let dashboard = reports::vendor_dashboard(&pool, vendor, ClaimWindow::today().date).await?;
    Ok(ApiResponse::success(dashboard))
}
