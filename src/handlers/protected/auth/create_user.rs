// handlers/protected/auth/create_user.rs - POST /api/auth/create-user handler

use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::hash_password;
use crate::config;
use crate::database::models::student::{is_institutional_email, normalize_email};
use crate::database::models::{NewStudent, Role, Student, User};
use crate::database::repository;
use crate::database::service::{self, NewUser};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::public::auth::register::validate_password;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::qr;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub vendor_id: Option<Uuid>,
    /// With `role = student` and a vendor, also registers the student directly
    pub roll_no: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedUser {
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<Student>,
}

/**
 * POST /api/auth/create-user - Admin creates a student, vendor or admin account
 *
 * Vendor accounts must name an existing vendor. A student account with `vendorId` and
 * `rollNo` also gets a registry entry with a fresh QR token, unless one already exists for
 * the email.
 */
pub async fn create_user_post(
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<CreatedUser> {
    auth_user.require_role(&[Role::Admin])?;

    let name = body.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::invalid_field("name", "is required"));
    }
    validate_password(&body.password)?;

    let domain = &config::config().institution.email_domain;
    if body.role == Role::Student && !is_institutional_email(&body.email, domain) {
        return Err(ApiError::invalid_field("email", format!("must be an @{domain} address")));
    }
    if body.role == Role::Vendor && body.vendor_id.is_none() {
        return Err(ApiError::invalid_field("vendorId", "is required for vendor accounts"));
    }

    let pool = DatabaseManager::pool().await?;
    if let Some(vendor_id) = body.vendor_id {
        repository::find_vendor(&pool, vendor_id)
            .await?
            .ok_or_else(|| ApiError::invalid_field("vendorId", "unknown vendor"))?;
    }

    let roll_no = body.roll_no.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let student = match (body.role, body.vendor_id, roll_no) {
        (Role::Student, Some(vendor_id), Some(roll_no)) => Some(NewStudent {
            name: name.clone(),
            email: normalize_email(&body.email),
            roll_no: roll_no.to_string(),
            vendor_id,
            qr_code: qr::new_token(),
        }),
        _ => None,
    };

    let account = NewUser {
        name,
        email: body.email.clone(),
        password_hash: hash_password(body.password).await?,
        role: body.role,
        vendor_id: body.vendor_id,
    };
    let (user, student) = service::insert_user_with_student(&pool, &account, student.as_ref()).await?;
    tracing::info!("Admin {} created {} account {}", auth_user.user_id, user.role, user.id);

    Ok(ApiResponse::created(CreatedUser { user, student }))
}
