pub mod meal_record;
pub mod student;
pub mod user;
pub mod vendor;

pub use meal_record::{MealRecord, NewClaim, DEFAULT_MEAL_TYPE};
pub use student::{MealHistoryEntry, NewStudent, Student, StudentChanges, StudentSummary};
pub use user::{Role, UnknownRole, User};
pub use vendor::{normalize_vendor_name, tidy_vendor_name, Vendor};
