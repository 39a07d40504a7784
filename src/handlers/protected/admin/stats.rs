// handlers/protected/admin/stats.rs - GET /api/admin/stats handler

use axum::Extension;

use crate::database::models::Role;
use crate::database::reports::{self, AdminStats};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::verification::ClaimWindow;

/// GET /api/admin/stats - Registry totals and today's claims per vendor
pub async fn admin_stats_get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<AdminStats> {
    auth_user.require_role(&[Role::Admin])?;

    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(reports::admin_stats(&pool, ClaimWindow::today().date).await?))
}
