// handlers/protected/admin/upload_csv.rs - POST /api/admin/upload-csv handler

use axum::extract::Multipart;
use axum::Extension;

use crate::config;
use crate::database::models::Role;
use crate::database::{DatabaseManager, PgRepository};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::roster::{self, ReconcileOptions, ReconciliationReport};

/**
 * POST /api/admin/upload-csv - Import a roster (multipart field `file`)
 *
 * A roster missing a required column is rejected with MISSING_COLUMNS before anything is
 * written. Otherwise the report comes back even when individual rows fail.
 */
pub async fn upload_csv_post(
    Extension(auth_user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> ApiResult<ReconciliationReport> {
    auth_user.require_role(&[Role::Admin])?;

    let mut contents = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") || field.file_name().is_some() {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Could not read upload: {e}")))?;
            contents = Some(bytes);
            break;
        }
    }
    let contents = contents.ok_or_else(|| ApiError::invalid_field("file", "a CSV file is required"))?;

    let rows = roster::read_roster(contents.as_ref())?;
    tracing::info!("Admin {} uploaded a roster with {} rows", auth_user.user_id, rows.len());

    let repository = PgRepository::new(DatabaseManager::pool().await?);
    let options = ReconcileOptions::from_config(config::config());
    let report = roster::reconcile(&repository, &rows, &options).await?;
    Ok(ApiResponse::success(report))
}
