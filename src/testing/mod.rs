//! In-memory storage for unit tests.
//!
//! `MemoryStore` implements the same seams as the Postgres repository, including the unique
//! constraints the engines rely on. Transactions work on a snapshot that is written back on
//! commit; a savepoint is a second snapshot.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::types::Json;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::student::normalize_email;
use crate::database::models::{
    normalize_vendor_name, tidy_vendor_name, MealHistoryEntry, MealRecord, NewClaim, NewStudent, Student,
    StudentChanges, Vendor,
};
use crate::database::store::{ActiveStudent, ClaimStore, RosterStore, RosterTx};

#[derive(Debug, Clone, Default)]
struct State {
    vendors: Vec<Vendor>,
    students: Vec<Student>,
    meals: Vec<MealRecord>,
}

impl State {
    fn check_student_unique(&self, id: Option<Uuid>, email: &str, roll_no: &str, qr_code: Option<&str>) -> Result<(), DatabaseError> {
        let email = normalize_email(email);
        for other in self.students.iter().filter(|s| Some(s.id) != id) {
            if normalize_email(&other.email) == email {
                return Err(DatabaseError::UniqueViolation("students_email_key".to_string()));
            }
            if other.roll_no == roll_no {
                return Err(DatabaseError::UniqueViolation("students_roll_no_key".to_string()));
            }
            if qr_code == Some(other.qr_code.as_str()) {
                return Err(DatabaseError::UniqueViolation("students_qr_code_key".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Faults {
    failing_insert_emails: HashSet<String>,
    hidden_claim_reads: usize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    faults: Arc<Mutex<Faults>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn new_vendor(name: &str, location: &str) -> Vendor {
    let now = Utc::now();
    Vendor {
        id: Uuid::new_v4(),
        name: name.trim().to_string(),
        location: location.to_string(),
        contact: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_vendor(&self, name: &str, location: &str) -> Vendor {
        let vendor = new_vendor(name, location);
        lock(&self.state).vendors.push(vendor.clone());
        vendor
    }

    pub fn seed_student(&self, name: &str, email: &str, roll_no: &str, vendor_id: Uuid) -> Student {
        let now = Utc::now();
        let student = Student {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: normalize_email(email),
            roll_no: roll_no.to_string(),
            vendor_id,
            is_active: true,
            qr_code: crate::qr::new_token(),
            last_claim_date: None,
            last_claim_vendor_id: None,
            meal_history: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        };
        lock(&self.state).students.push(student.clone());
        student
    }

    pub fn set_vendor_active(&self, id: Uuid, active: bool) {
        if let Some(vendor) = lock(&self.state).vendors.iter_mut().find(|v| v.id == id) {
            vendor.is_active = active;
        }
    }

    pub fn set_student_active(&self, id: Uuid, active: bool) {
        if let Some(student) = lock(&self.state).students.iter_mut().find(|s| s.id == id) {
            student.is_active = active;
        }
    }

    /// Make `insert_student` fail with a connection error for this email
    pub fn fail_inserts_for(&self, email: &str) {
        lock(&self.faults).failing_insert_emails.insert(normalize_email(email));
    }

    /// The next `count` claim lookups report nothing, as if a concurrent writer had not
    /// committed yet.
    pub fn hide_next_claim_reads(&self, count: usize) {
        lock(&self.faults).hidden_claim_reads = count;
    }

    pub fn students(&self) -> Vec<Student> {
        lock(&self.state).students.clone()
    }

    pub fn student(&self, id: Uuid) -> Option<Student> {
        lock(&self.state).students.iter().find(|s| s.id == id).cloned()
    }

    pub fn student_by_email(&self, email: &str) -> Option<Student> {
        let email = normalize_email(email);
        lock(&self.state).students.iter().find(|s| s.email == email).cloned()
    }

    pub fn vendors(&self) -> Vec<Vendor> {
        lock(&self.state).vendors.clone()
    }

    pub fn vendor(&self, id: Uuid) -> Option<Vendor> {
        lock(&self.state).vendors.iter().find(|v| v.id == id).cloned()
    }

    pub fn meal_records(&self) -> Vec<MealRecord> {
        lock(&self.state).meals.clone()
    }
}

pub struct MemoryTx {
    store: MemoryStore,
    working: State,
    savepoint: Option<State>,
}

#[async_trait]
impl RosterStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn RosterTx>, DatabaseError> {
        let working = lock(&self.state).clone();
        Ok(Box::new(MemoryTx {
            store: self.clone(),
            working,
            savepoint: None,
        }))
    }
}

#[async_trait]
impl RosterTx for MemoryTx {
    async fn active_vendors(&mut self) -> Result<Vec<Vendor>, DatabaseError> {
        Ok(self.working.vendors.iter().filter(|v| v.is_active).cloned().collect())
    }

    async fn upsert_vendor(&mut self, name: &str, location: &str) -> Result<Vendor, DatabaseError> {
        let key = normalize_vendor_name(name);
        if let Some(existing) = self.working.vendors.iter_mut().find(|v| normalize_vendor_name(&v.name) == key) {
            existing.is_active = true;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }
        let vendor = new_vendor(&tidy_vendor_name(name), location);
        self.working.vendors.push(vendor.clone());
        Ok(vendor)
    }

    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>, DatabaseError> {
        let email = normalize_email(email);
        Ok(self.working.students.iter().find(|s| normalize_email(&s.email) == email).cloned())
    }

    async fn find_student_by_roll_no(&mut self, roll_no: &str) -> Result<Option<Student>, DatabaseError> {
        Ok(self.working.students.iter().find(|s| s.roll_no == roll_no).cloned())
    }

    async fn insert_student(&mut self, student: &NewStudent) -> Result<Student, DatabaseError> {
        if lock(&self.store.faults).failing_insert_emails.contains(&normalize_email(&student.email)) {
            return Err(DatabaseError::ConnectionError("injected failure".to_string()));
        }
        self.working
            .check_student_unique(None, &student.email, &student.roll_no, Some(&student.qr_code))?;

        let now = Utc::now();
        let created = Student {
            id: Uuid::new_v4(),
            name: student.name.clone(),
            email: student.email.clone(),
            roll_no: student.roll_no.clone(),
            vendor_id: student.vendor_id,
            is_active: true,
            qr_code: student.qr_code.clone(),
            last_claim_date: None,
            last_claim_vendor_id: None,
            meal_history: Json(Vec::new()),
            created_at: now,
            updated_at: now,
        };
        self.working.students.push(created.clone());
        Ok(created)
    }

    async fn update_student(&mut self, id: Uuid, changes: &StudentChanges) -> Result<Student, DatabaseError> {
        let current = self
            .working
            .students
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("student {id}")))?;

        let email = changes.email.clone().unwrap_or(current.email.clone());
        let roll_no = changes.roll_no.clone().unwrap_or(current.roll_no.clone());
        self.working.check_student_unique(Some(id), &email, &roll_no, None)?;

        let student = self
            .working
            .students
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| DatabaseError::NotFound(format!("student {id}")))?;
        if let Some(name) = &changes.name {
            student.name = name.clone();
        }
        student.email = email;
        student.roll_no = roll_no;
        if let Some(vendor_id) = changes.vendor_id {
            student.vendor_id = vendor_id;
        }
        if let Some(active) = changes.is_active {
            student.is_active = active;
        }
        student.updated_at = Utc::now();
        Ok(student.clone())
    }

    async fn active_students(&mut self) -> Result<Vec<ActiveStudent>, DatabaseError> {
        Ok(self
            .working
            .students
            .iter()
            .filter(|s| s.is_active)
            .map(|s| ActiveStudent {
                id: s.id,
                email: s.email.clone(),
            })
            .collect())
    }

    async fn deactivate_students(&mut self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        let mut changed = 0;
        for student in self.working.students.iter_mut() {
            if student.is_active && ids.contains(&student.id) {
                student.is_active = false;
                student.updated_at = Utc::now();
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn savepoint(&mut self) -> Result<(), DatabaseError> {
        self.savepoint = Some(self.working.clone());
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<(), DatabaseError> {
        let snapshot = self
            .savepoint
            .clone()
            .ok_or_else(|| DatabaseError::NotFound("savepoint".to_string()))?;
        self.working = snapshot;
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<(), DatabaseError> {
        self.savepoint = None;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        let MemoryTx { store, working, .. } = *self;
        let mut state = lock(&store.state);
        state.vendors = working.vendors;
        state.students = working.students;
        Ok(())
    }
}

#[async_trait]
impl ClaimStore for MemoryStore {
    async fn find_active_student(&self, identifier: &str) -> Result<Option<Student>, DatabaseError> {
        let state = lock(&self.state);
        let active = || state.students.iter().filter(|s| s.is_active);
        let found = active()
            .find(|s| s.qr_code == identifier)
            .or_else(|| active().find(|s| s.roll_no == identifier))
            .or_else(|| active().find(|s| s.email == normalize_email(identifier)));
        Ok(found.cloned())
    }

    async fn find_vendor(&self, id: Uuid) -> Result<Option<Vendor>, DatabaseError> {
        Ok(self.vendor(id))
    }

    async fn find_claim(
        &self,
        student_id: Uuid,
        date: NaiveDate,
        meal_type: &str,
    ) -> Result<Option<MealRecord>, DatabaseError> {
        {
            let mut faults = lock(&self.faults);
            if faults.hidden_claim_reads > 0 {
                faults.hidden_claim_reads -= 1;
                return Ok(None);
            }
        }
        let state = lock(&self.state);
        Ok(state
            .meals
            .iter()
            .find(|m| m.student_id == student_id && m.meal_date == date && m.meal_type == meal_type && m.claimed)
            .cloned())
    }

    async fn record_claim(&self, claim: &NewClaim) -> Result<MealRecord, DatabaseError> {
        let mut state = lock(&self.state);
        let duplicate = state.meals.iter().any(|m| {
            m.student_id == claim.student_id
                && m.meal_date == claim.meal_date
                && m.meal_type == claim.meal_type
                && m.claimed
        });
        if duplicate {
            return Err(DatabaseError::UniqueViolation("meal_records_one_claim_per_day".to_string()));
        }

        let student = state
            .students
            .iter_mut()
            .find(|s| s.id == claim.student_id)
            .ok_or_else(|| DatabaseError::NotFound(format!("student {}", claim.student_id)))?;
        student.meal_history.0.push(MealHistoryEntry {
            date: claim.meal_date,
            vendor_id: claim.vendor_id,
            claimed: true,
            claimed_at: claim.claimed_at,
        });
        student.last_claim_date = Some(claim.meal_date);
        student.last_claim_vendor_id = Some(claim.vendor_id);

        let record = claim.clone().into_record(Uuid::new_v4());
        state.meals.push(record.clone());
        Ok(record)
    }
}
