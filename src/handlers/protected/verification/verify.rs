// handlers/protected/verification/verify.rs - POST /api/verification/verify handler

use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::Role;
use crate::database::{ClaimStore, DatabaseManager, PgRepository};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::verification::{self, Verification, VerificationResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub identifier: String,
    /// Defaults to the caller's own vendor
    pub vendor_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
struct VerifyEnvelope {
    success: bool,
    data: VerificationResult,
}

/// Every outcome carries the structured result; the status tells them apart too
/// (200 claimed, 404 not found, 403 wrong vendor, 409 already claimed).
#[derive(Debug)]
pub struct VerifyResponse(pub Verification);

impl IntoResponse for VerifyResponse {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let data = self.0.into_result();
        let envelope = VerifyEnvelope {
            success: data.verified,
            data,
        };
        (status, Json(envelope)).into_response()
    }
}

/**
 * POST /api/verification/verify - Redeem today's meal for a student
 *
 * Body: `{ "identifier": "<QR token | roll number | email>", "vendorId": "<uuid>" }`.
 * Vendor staff may only verify at their own vendor; admins at any.
 */
pub async fn verify_post(
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<VerifyRequest>,
) -> Result<VerifyResponse, ApiError> {
    auth_user.require_role(&[Role::Vendor, Role::Admin])?;

    let vendor_id = body
        .vendor_id
        .or(auth_user.vendor_id)
        .ok_or_else(|| ApiError::invalid_field("vendorId", "is required"))?;
    auth_user.require_vendor_access(vendor_id)?;

    let identifier = body.identifier.trim();
    if identifier.is_empty() {
        return Err(ApiError::invalid_field("identifier", "is required"));
    }

    let repository = PgRepository::new(DatabaseManager::pool().await?);
    repository
        .find_vendor(vendor_id)
        .await?
        .filter(|v| v.is_active)
        .ok_or_else(|| ApiError::not_found(format!("Vendor {vendor_id} not found")))?;

    let outcome = verification::verify(&repository, identifier, vendor_id, Some(auth_user.user_id)).await?;
    tracing::debug!("Verification by {} at {}: {:?}", auth_user.user_id, vendor_id, outcome.status());
    Ok(VerifyResponse(outcome))
}
