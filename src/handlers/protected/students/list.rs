// handlers/protected/students/list.rs - GET /api/students handler

use axum::extract::Query;
use axum::Extension;

use crate::database::models::Role;
use crate::database::service::{self, StudentPage, StudentQuery};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/students?search=&vendorId=&active=&page=&limit=
///
/// Vendor staff are pinned to their own vendor whatever `vendorId` says.
pub async fn students_get(
    Extension(auth_user): Extension<AuthUser>,
    Query(mut query): Query<StudentQuery>,
) -> ApiResult<StudentPage> {
    auth_user.require_role(&[Role::Admin, Role::Vendor])?;
    query.check_page().map_err(|problem| ApiError::invalid_field("page", problem))?;
    if auth_user.role == Role::Vendor {
        let vendor_id = auth_user
            .vendor_id
            .ok_or_else(|| ApiError::forbidden("No vendor assigned to this account"))?;
        query.vendor_id = Some(vendor_id);
    }

    let pool = DatabaseManager::pool().await?;
    let page = service::list_students(&pool, &query).await?;
    Ok(ApiResponse::success(page))
}
