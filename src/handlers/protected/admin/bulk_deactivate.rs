// handlers/protected/admin/bulk_deactivate.rs - POST /api/admin/bulk-deactivate handler

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Role;
use crate::database::service;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeactivateRequest {
    pub student_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeactivated {
    pub deactivated: u64,
}

/// POST /api/admin/bulk-deactivate - `{ "studentIds": [...] }`; already inactive ids are not counted
pub async fn bulk_deactivate_post(
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<BulkDeactivateRequest>,
) -> ApiResult<BulkDeactivated> {
    auth_user.require_role(&[Role::Admin])?;
    if body.student_ids.is_empty() {
        return Err(ApiError::invalid_field("studentIds", "must not be empty"));
    }

    let pool = DatabaseManager::pool().await?;
    let deactivated = service::deactivate_students(&pool, &body.student_ids).await?;
    tracing::info!("Admin {} bulk-deactivated {} students", auth_user.user_id, deactivated);
    Ok(ApiResponse::success(BulkDeactivated { deactivated }))
}
