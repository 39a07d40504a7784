// handlers/protected/students/record.rs - single student handlers

use axum::extract::Path;
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::config;
use crate::database::models::student::{is_institutional_email, normalize_email};
use crate::database::models::{MealRecord, Role, StudentChanges};
use crate::database::service::{self, StudentListItem};
use crate::database::{repository, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

use super::ensure_can_view;

/// GET /api/students/:id
pub async fn student_get(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<StudentListItem> {
    let pool = DatabaseManager::pool().await?;
    let item = service::get_student(&pool, id).await?;
    ensure_can_view(&auth_user, &item.student)?;
    Ok(ApiResponse::success(item))
}

fn normalize_changes(mut changes: StudentChanges) -> Result<StudentChanges, ApiError> {
    if let Some(name) = changes.name.as_deref().map(str::trim) {
        if name.is_empty() {
            return Err(ApiError::invalid_field("name", "must not be blank"));
        }
        changes.name = Some(name.to_string());
    }
    if let Some(roll_no) = changes.roll_no.as_deref().map(str::trim) {
        if roll_no.is_empty() {
            return Err(ApiError::invalid_field("rollNo", "must not be blank"));
        }
        changes.roll_no = Some(roll_no.to_string());
    }
    if let Some(email) = changes.email.as_deref() {
        let domain = &config::config().institution.email_domain;
        if !is_institutional_email(email, domain) {
            return Err(ApiError::invalid_field("email", format!("must be an @{domain} address")));
        }
        changes.email = Some(normalize_email(email));
    }
    Ok(changes)
}

/// PUT /api/students/:id - Admin edit of mutable fields. The QR token cannot be changed.
pub async fn student_put(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<StudentChanges>,
) -> ApiResult<StudentListItem> {
    auth_user.require_role(&[Role::Admin])?;
    let changes = normalize_changes(changes)?;

    let pool = DatabaseManager::pool().await?;
    if let Some(vendor_id) = changes.vendor_id {
        repository::find_vendor(&pool, vendor_id)
            .await?
            .ok_or_else(|| ApiError::invalid_field("vendorId", "unknown vendor"))?;
    }

    if !changes.is_empty() {
        repository::find_student(&pool, id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Student {id} not found")))?;
        repository::update_student(&pool, id, &changes).await?;
        tracing::info!("Admin {} updated student {}", auth_user.user_id, id);
    }

    Ok(ApiResponse::success(service::get_student(&pool, id).await?))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deactivated {
    pub id: Uuid,
    pub is_active: bool,
}

/// DELETE /api/students/:id - Soft delete; history stays attributable
pub async fn student_delete(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Deactivated> {
    auth_user.require_role(&[Role::Admin])?;

    let pool = DatabaseManager::pool().await?;
    repository::find_student(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Student {id} not found")))?;
    service::deactivate_students(&pool, &[id]).await?;
    tracing::info!("Admin {} deactivated student {}", auth_user.user_id, id);

    Ok(ApiResponse::success(Deactivated { id, is_active: false }))
}

/// GET /api/students/:id/meals - Claim ledger, newest first
pub async fn student_meals_get(
    Extension(auth_user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<MealRecord>> {
    let pool = DatabaseManager::pool().await?;
    let student = repository::find_student(&pool, id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Student {id} not found")))?;
    ensure_can_view(&auth_user, &student)?;

    Ok(ApiResponse::success(service::student_meals(&pool, id).await?))
}
