// handlers/protected/vendors/student_search.rs - GET /api/vendors/:id/students/search handler

use axum::extract::{Path, Query};
use axum::Extension;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::service::{self, StudentListItem};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
pub struct StudentSearchQuery {
    pub q: Option<String>,
    pub limit: Option<i64>,
}

/// GET /api/vendors/:id/students/search?q= - Active students of one vendor by name, email or roll
pub async fn vendor_student_search_get(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<StudentSearchQuery>,
) -> ApiResult<Vec<StudentListItem>> {
    auth_user.require_vendor_access(id)?;

    let term = query.q.as_deref().map(str::trim).unwrap_or("");
    if term.is_empty() {
        return Err(ApiError::invalid_field("q", "search term is required"));
    }

    let pool = DatabaseManager::pool().await?;
    let students = service::search_vendor_students(&pool, id, term, query.limit.unwrap_or(20)).await?;
    Ok(ApiResponse::success(students))
}
