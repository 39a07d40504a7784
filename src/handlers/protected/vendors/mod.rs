// handlers/protected/vendors/mod.rs - Vendor directory handlers

pub mod dashboard; // GET /api/vendors/:id/dashboard
pub mod list; // GET /api/vendors
pub mod record; // GET|PUT /api/vendors/:id, POST /api/vendors
pub mod student_search; // GET /api/vendors/:id/students/search

pub use dashboard::vendor_dashboard_get;
pub use list::vendors_get;
pub use record::{vendor_get, vendor_post, vendor_put};
pub use student_search::vendor_student_search_get;
