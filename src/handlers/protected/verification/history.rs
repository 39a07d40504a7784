// handlers/protected/verification/history.rs - GET /api/verification/history/:vendorId handler

use axum::extract::{Path, Query};
use axum::Extension;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::reports::{self, ClaimHistoryItem};
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::verification::ClaimWindow;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<NaiveDate>,
    pub limit: Option<i64>,
}

/// GET /api/verification/history/:vendorId[?date=&limit=] - Claims for one day, newest first
pub async fn history_get(
    Extension(auth_user): Extension<AuthUser>,
    Path(vendor_id): Path<Uuid>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Vec<ClaimHistoryItem>> {
    auth_user.require_vendor_access(vendor_id)?;

    let date = query.date.unwrap_or_else(|| ClaimWindow::today().date);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(reports::claim_history(&pool, vendor_id, date, limit).await?))
}
