// handlers/protected/auth/mod.rs - Account handlers for authenticated principals

pub mod create_user; // POST /api/auth/create-user (admin)
pub mod me; // GET /api/auth/me

pub use create_user::create_user_post;
pub use me::me_get;
