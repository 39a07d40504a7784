// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// The JWT middleware injects `AuthUser`; role and vendor scoping are checked per handler
// with `require_role` / `require_vendor_access`.
pub mod admin; // roster import/export, registry stats, bulk deactivation
pub mod auth; // principal info, admin account creation
pub mod students; // student registry
pub mod vendors; // vendor directory and dashboards
pub mod verification; // meal verification and claim reporting
