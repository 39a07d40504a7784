// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (JWT auth, role checks inside each handler)
pub mod public; // /api/auth/login, /api/auth/register
pub mod protected; // everything else under /api
