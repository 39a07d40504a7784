// handlers/protected/admin/export.rs - GET /api/admin/export-students handler

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Extension;

use crate::database::models::Role;
use crate::database::service;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::roster;

/// GET /api/admin/export-students - Whole registry as a re-importable CSV
pub async fn export_students_get(Extension(auth_user): Extension<AuthUser>) -> Result<Response, ApiError> {
    auth_user.require_role(&[Role::Admin])?;

    let pool = DatabaseManager::pool().await?;
    let students = service::export_students(&pool).await?;

    let mut body = Vec::new();
    roster::write_roster(&mut body, &students)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"students.csv\""),
        ],
        body,
    )
        .into_response())
}
