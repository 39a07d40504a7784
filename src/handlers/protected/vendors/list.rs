// handlers/protected/vendors/list.rs - GET /api/vendors handler

use axum::extract::Query;
use axum::Extension;
use serde::Deserialize;

use crate::database::models::{Role, Vendor};
use crate::database::service;
use crate::database::DatabaseManager;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorListQuery {
    pub include_inactive: Option<bool>,
}

/// GET /api/vendors[?includeInactive=true] - Inactive vendors are listed for admins only
pub async fn vendors_get(
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<VendorListQuery>,
) -> ApiResult<Vec<Vendor>> {
    let include_inactive = query.include_inactive.unwrap_or(false) && auth_user.role == Role::Admin;

    let pool = DatabaseManager::pool().await?;
    Ok(ApiResponse::success(service::list_vendors(&pool, include_inactive).await?))
}
