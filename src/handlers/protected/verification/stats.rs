// handlers/protected/verification/stats.rs - GET /api/verification/stats/:vendorId handler

use axum::extract::Path;
use axum::Extension;
use uuid::Uuid;

use crate::database::reports::{self, ClaimStats};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::verification::ClaimWindow;

/// GET /api/verification/stats/:vendorId - Today's count plus the trailing week
pub async fn stats_get(
    Extension(auth_user): Extension<AuthUser>,
    Path(vendor_id): Path<Uuid>,
) -> ApiResult<ClaimStats> {
    auth_user.require_vendor_access(vendor_id)?;

    let pool = DatabaseManager::pool().await?;
    let stats = reports::claim_stats(&pool, vendor_id, ClaimWindow::today().date).await?;
    Ok(ApiResponse::success(stats))
}
