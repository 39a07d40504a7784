// handlers/protected/verification/mod.rs - Meal verification handlers

pub mod history; // GET /api/verification/history/:vendorId
pub mod stats; // GET /api/verification/stats/:vendorId
pub mod verify; // POST /api/verification/verify

pub use history::history_get;
pub use stats::stats_get;
pub use verify::verify_post;
