// handlers/protected/admin/mod.rs - Administrative handlers (admin role only)

pub mod bulk_deactivate; // POST /api/admin/bulk-deactivate
pub mod export; // GET /api/admin/export-students
pub mod stats; // GET /api/admin/stats
pub mod upload_csv; // POST /api/admin/upload-csv

pub use bulk_deactivate::bulk_deactivate_post;
pub use export::export_students_get;
pub use stats::admin_stats_get;
pub use upload_csv::upload_csv_post;
