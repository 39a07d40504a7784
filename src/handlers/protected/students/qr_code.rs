// handlers/protected/students/qr_code.rs - GET /api/students/my-qr-code handler

use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use crate::database::models::{Role, StudentSummary};
use crate::database::{repository, DatabaseManager};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::qr;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyQrCode {
    pub qr_code: String,
    /// `data:image/svg+xml;base64,...`
    pub qr_image: String,
    pub student: StudentSummary,
    pub vendor_location: String,
}

/**
 * GET /api/students/my-qr-code - The calling student's QR token and rendered image
 *
 * NO_STUDENT_RECORD (404) when no active registry entry carries the caller's email,
 * NO_VENDOR_ASSIGNED (409) when the assigned vendor is missing or inactive.
 */
pub async fn my_qr_code_get(Extension(auth_user): Extension<AuthUser>) -> ApiResult<MyQrCode> {
    auth_user.require_role(&[Role::Student])?;

    let pool = DatabaseManager::pool().await?;
    let student = repository::find_student_by_email(&pool, &auth_user.email)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| {
            ApiError::coded(
                StatusCode::NOT_FOUND,
                "NO_STUDENT_RECORD",
                "No active student record for this account; ask an administrator to import the roster",
            )
        })?;

    let vendor = repository::find_vendor(&pool, student.vendor_id)
        .await?
        .filter(|v| v.is_active)
        .ok_or_else(|| {
            ApiError::coded(StatusCode::CONFLICT, "NO_VENDOR_ASSIGNED", "No active vendor is assigned to this student")
        })?;

    let qr_image = qr::render_data_url(&student.qr_code)?;
    Ok(ApiResponse::success(MyQrCode {
        qr_code: student.qr_code.clone(),
        qr_image,
        student: student.summary(Some(vendor.name)),
        vendor_location: vendor.location,
    }))
}
