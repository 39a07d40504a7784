// handlers/protected/students/search.rs - GET /api/students/search/:identifier handler

use axum::extract::Path;
use axum::Extension;

use crate::database::models::Role;
use crate::database::service::{self, StudentListItem};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/students/search/:identifier - QR token, roll number or email lookup
///
/// Unlike verification this also finds inactive students, so staff can tell "deactivated"
/// apart from "unknown".
pub async fn student_search_get(
    Extension(auth_user): Extension<AuthUser>,
    Path(identifier): Path<String>,
) -> ApiResult<StudentListItem> {
    auth_user.require_role(&[Role::Admin, Role::Vendor])?;

    let pool = DatabaseManager::pool().await?;
    let student = service::search_student(&pool, &identifier)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("No student matches '{}'", identifier.trim())))?;
    Ok(ApiResponse::success(student))
}
