// handlers/public/auth/mod.rs - Public authentication handlers

use serde::Serialize;

use crate::auth::{generate_jwt, Claims};
use crate::config;
use crate::database::models::User;
use crate::error::ApiError;

pub mod login; // POST /api/auth/login - authenticate and get JWT
pub mod register; // POST /api/auth/register - student self-registration

pub use login::login_post;
pub use register::register_post;

/// Token plus the principal it was issued for
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub role: String,
    pub expires_in: u64,
    pub user: User,
}

impl TokenResponse {
    pub fn issue(user: User) -> Result<Self, ApiError> {
        let token = generate_jwt(&Claims::for_user(&user))?;
        Ok(Self {
            token,
            role: user.role.to_string(),
            expires_in: config::config().security.jwt_expiry_hours * 3600,
            user,
        })
    }
}
