// handlers/protected/students/mod.rs - Student registry handlers

use crate::database::models::{Role, Student};
use crate::error::ApiError;
use crate::middleware::AuthUser;

pub mod list; // GET /api/students
pub mod qr_code; // GET /api/students/my-qr-code
pub mod record; // GET|PUT|DELETE /api/students/:id, GET /api/students/:id/meals
pub mod search; // GET /api/students/search/:identifier

pub use list::students_get;
pub use qr_code::my_qr_code_get;
pub use record::{student_delete, student_get, student_meals_get, student_put};
pub use search::student_search_get;

/// Admins see everyone, vendor staff their own students, students themselves
fn ensure_can_view(auth_user: &AuthUser, student: &Student) -> Result<(), ApiError> {
    match auth_user.role {
        Role::Admin => Ok(()),
        Role::Vendor => auth_user.require_vendor_access(student.vendor_id),
        Role::Student if student.email.eq_ignore_ascii_case(&auth_user.email) => Ok(()),
        Role::Student => Err(ApiError::forbidden("Students can only view their own record")),
    }
}
