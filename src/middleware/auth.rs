use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::{validate_jwt, Claims};
use crate::database::models::Role;
use crate::error::ApiError;

/// Authenticated principal extracted from the JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub vendor_id: Option<Uuid>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
            vendor_id: claims.vendor_id,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// 403 unless the principal holds one of `roles`
    pub fn require_role(&self, roles: &[Role]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::forbidden(format!(
                "This action requires role: {}",
                roles.iter().map(Role::as_str).collect::<Vec<_>>().join(" or ")
            )))
        }
    }

    /// Admins act for any vendor; vendor staff only for their own
    pub fn require_vendor_access(&self, vendor_id: Uuid) -> Result<(), ApiError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Vendor if self.vendor_id == Some(vendor_id) => Ok(()),
            Role::Vendor => Err(ApiError::forbidden("Access limited to your assigned vendor")),
            Role::Student => Err(ApiError::forbidden("Vendor or admin access required")),
        }
    }
}

/// JWT authentication middleware that validates tokens and injects the principal
pub async fn jwt_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_jwt_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {}", e);
        ApiError::unauthorized(e.to_string())
    })?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(role: Role, vendor_id: Option<Uuid>) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "someone@inst.edu".to_string(),
            role,
            vendor_id,
        }
    }

    #[test]
    fn vendor_access_is_scoped() {
        let own = Uuid::new_v4();
        assert!(user(Role::Admin, None).require_vendor_access(own).is_ok());
        assert!(user(Role::Vendor, Some(own)).require_vendor_access(own).is_ok());
        assert!(user(Role::Vendor, Some(Uuid::new_v4())).require_vendor_access(own).is_err());
        assert!(user(Role::Vendor, None).require_vendor_access(own).is_err());
        assert!(user(Role::Student, None).require_vendor_access(own).is_err());
    }

    #[test]
    fn role_gate() {
        let student = user(Role::Student, None);
        assert!(student.require_role(&[Role::Student]).is_ok());
        assert!(student.require_role(&[Role::Vendor, Role::Admin]).is_err());
    }

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_jwt_from_headers(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_jwt_from_headers(&headers).unwrap(), "abc.def.ghi");
    }
}
