//! Storage seams used by the roster reconciliation engine and the verification workflow.
//!
//! Postgres implements these in [`crate::database::repository`]; unit tests run against
//! the in-memory store in `crate::testing`.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{MealRecord, NewClaim, NewStudent, Student, StudentChanges, Vendor};

/// Identity of an active student as seen by the deactivation sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStudent {
    pub id: Uuid,
    pub email: String,
}

/// Opens units of work for a roster import
#[async_trait]
pub trait RosterStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn RosterTx>, DatabaseError>;
}

/// One open transaction. Nothing written through it is visible to readers until `commit`.
///
/// `savepoint`/`rollback_to_savepoint`/`release_savepoint` scope a single roster row so a
/// failed write can be undone without aborting the batch. Savepoints do not nest.
#[async_trait]
pub trait RosterTx: Send {
    async fn active_vendors(&mut self) -> Result<Vec<Vendor>, DatabaseError>;

    /// Create a vendor, or reactivate the existing one whose name matches case-insensitively.
    async fn upsert_vendor(&mut self, name: &str, location: &str) -> Result<Vendor, DatabaseError>;

    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>, DatabaseError>;

    async fn find_student_by_roll_no(&mut self, roll_no: &str) -> Result<Option<Student>, DatabaseError>;

    async fn insert_student(&mut self, student: &NewStudent) -> Result<Student, DatabaseError>;

    async fn update_student(&mut self, id: Uuid, changes: &StudentChanges) -> Result<Student, DatabaseError>;

    async fn active_students(&mut self) -> Result<Vec<ActiveStudent>, DatabaseError>;

    /// Flip `is_active` off for the given ids; returns how many rows changed.
    async fn deactivate_students(&mut self, ids: &[Uuid]) -> Result<u64, DatabaseError>;

    async fn savepoint(&mut self) -> Result<(), DatabaseError>;

    async fn rollback_to_savepoint(&mut self) -> Result<(), DatabaseError>;

    async fn release_savepoint(&mut self) -> Result<(), DatabaseError>;

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError>;
}

/// Reads and the single atomic write of the verification workflow
#[async_trait]
pub trait ClaimStore: Send + Sync {
    /// Active student whose QR token, roll number or email equals `identifier`.
    async fn find_active_student(&self, identifier: &str) -> Result<Option<Student>, DatabaseError>;

    async fn find_vendor(&self, id: Uuid) -> Result<Option<Vendor>, DatabaseError>;

    async fn find_claim(
        &self,
        student_id: Uuid,
        date: NaiveDate,
        meal_type: &str,
    ) -> Result<Option<MealRecord>, DatabaseError>;

    /// Insert the meal record, append to the student's meal history and refresh the
    /// last-claim cache in one transaction.
    ///
    /// Fails with [`DatabaseError::UniqueViolation`] when a claimed record already exists
    /// for the same student, date and meal type.
    async fn record_claim(&self, claim: &NewClaim) -> Result<MealRecord, DatabaseError>;
}
