// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition only. Every other endpoint sits behind the JWT middleware.
pub mod auth;
