//! Roster reconciliation.
//!
//! Runs in two phases. The create/update phase walks the roster in input order inside one
//! transaction, with every row wrapped in a savepoint so a failing row is undone without
//! aborting the batch. Once that commits, the deactivation sweep runs in its own transaction
//! against the committed set of roster emails. Between the two commits a reader can see new
//! roster entries while stale students are still active.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::manager::DatabaseError;
use crate::database::models::student::{is_institutional_email, normalize_email};
use crate::database::models::{normalize_vendor_name, NewStudent, Student, StudentChanges, Vendor};
use crate::database::store::{RosterStore, RosterTx};
use crate::qr;
use crate::roster::RosterRow;

#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub email_domain: String,
    /// Location given to auto-created vendors when the row has none
    pub default_location: String,
    pub max_reported_errors: usize,
}

impl ReconcileOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            email_domain: config.institution.email_domain.clone(),
            default_location: config.roster.default_vendor_location.clone(),
            max_reported_errors: config.roster.max_reported_errors,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    pub total_rows: usize,
    /// Rows applied without error: `created + updated + unchanged`
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub error_count: usize,
    /// First few error messages, `"Row <line>: <reason>"`
    pub errors: Vec<String>,
    /// Vendors created (or reactivated) because no active vendor matched
    pub vendors_created: usize,
    pub deactivated: u64,
    /// Set when the roster held no usable email and the sweep was not run
    pub deactivation_skipped: bool,
}

impl ReconciliationReport {
    fn new(total_rows: usize) -> Self {
        Self {
            total_rows,
            ..Default::default()
        }
    }

    fn record(&mut self, outcome: RowOutcome) {
        self.processed += 1;
        match outcome {
            RowOutcome::Created => self.created += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Unchanged => self.unchanged += 1,
        }
    }

    fn record_error(&mut self, line: u64, reason: &str, limit: usize) {
        self.error_count += 1;
        if self.errors.len() < limit {
            self.errors.push(format!("Row {line}: {reason}"));
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Created,
    Updated,
    Unchanged,
}

#[derive(Debug)]
enum RowError {
    Invalid(String),
    Store(DatabaseError),
}

impl From<DatabaseError> for RowError {
    fn from(err: DatabaseError) -> Self {
        RowError::Store(err)
    }
}

impl RowError {
    fn reason(&self) -> String {
        match self {
            RowError::Invalid(reason) => reason.clone(),
            RowError::Store(DatabaseError::UniqueViolation(_)) => {
                "could not be saved: a unique field clashes with another record".to_string()
            }
            RowError::Store(_) => "could not be saved".to_string(),
        }
    }
}

/// Vendor name lookup for a single run. Never shared across imports.
#[derive(Debug, Default)]
struct VendorIndex {
    by_key: HashMap<String, Uuid>,
}

enum VendorMatch {
    Found(Uuid),
    Ambiguous(usize),
    Missing,
}

impl VendorIndex {
    fn new(vendors: &[Vendor]) -> Self {
        let mut index = Self::default();
        for vendor in vendors {
            index.insert(vendor);
        }
        index
    }

    fn insert(&mut self, vendor: &Vendor) {
        self.by_key.insert(normalize_vendor_name(&vendor.name), vendor.id);
    }

    fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Exact key first, then a unique vendor whose key contains the row's key
    fn resolve(&self, name: &str) -> VendorMatch {
        let key = normalize_vendor_name(name);
        if let Some(id) = self.by_key.get(&key) {
            return VendorMatch::Found(*id);
        }

        let candidates: HashSet<Uuid> = self
            .by_key
            .iter()
            .filter(|(existing, _)| existing.contains(&key))
            .map(|(_, id)| *id)
            .collect();

        match candidates.len() {
            0 => VendorMatch::Missing,
            1 => candidates.into_iter().next().map_or(VendorMatch::Missing, VendorMatch::Found),
            n => VendorMatch::Ambiguous(n),
        }
    }
}

struct AppliedRow {
    outcome: RowOutcome,
    new_vendor: Option<Vendor>,
}

/// Identifiers already written by earlier rows of this run, keyed to their line
#[derive(Debug, Default)]
struct SeenRows {
    emails: HashMap<String, u64>,
    roll_nos: HashMap<String, u64>,
}

impl SeenRows {
    fn check(&self, email: &str, roll_no: &str) -> Result<(), String> {
        if let Some(line) = self.emails.get(email) {
            return Err(format!("duplicate email in roster, also on row {line}"));
        }
        if let Some(line) = self.roll_nos.get(roll_no.trim()) {
            return Err(format!("duplicate roll number in roster, also on row {line}"));
        }
        Ok(())
    }

    fn record(&mut self, line: u64, email: String, roll_no: &str) {
        self.emails.insert(email, line);
        self.roll_nos.insert(roll_no.trim().to_string(), line);
    }
}

fn missing_fields(row: &RosterRow) -> Vec<&'static str> {
    [
        ("name", &row.name),
        ("email", &row.email),
        ("roll number", &row.roll_no),
        ("vendor", &row.vendor),
    ]
    .into_iter()
    .filter(|(_, value)| value.trim().is_empty())
    .map(|(field, _)| field)
    .collect()
}

fn validate(row: &RosterRow, options: &ReconcileOptions) -> Result<(), String> {
    let missing = missing_fields(row);
    if !missing.is_empty() {
        return Err(format!("missing {}", missing.join(", ")));
    }
    if !is_institutional_email(&row.email, &options.email_domain) {
        return Err(format!(
            "email '{}' is not a valid @{} address",
            row.email,
            options.email_domain.trim_start_matches('@')
        ));
    }
    Ok(())
}

fn changes_for(student: &Student, row: &RosterRow, email: &str, vendor_id: Uuid) -> StudentChanges {
    StudentChanges {
        name: (student.name != row.name).then(|| row.name.clone()),
        email: (student.email != email).then(|| email.to_string()),
        roll_no: (student.roll_no != row.roll_no).then(|| row.roll_no.clone()),
        vendor_id: (student.vendor_id != vendor_id).then_some(vendor_id),
        is_active: (!student.is_active).then_some(true),
    }
}

async fn find_existing(tx: &mut dyn RosterTx, email: &str, roll_no: &str) -> Result<Option<Student>, RowError> {
    let by_email = tx.find_student_by_email(email).await?;
    let by_roll = tx.find_student_by_roll_no(roll_no).await?;

    match (by_email, by_roll) {
        (Some(a), Some(b)) if a.id != b.id => Err(RowError::Invalid(format!(
            "conflicting identifiers: email {} belongs to {} ({}) but roll number {} belongs to {} ({})",
            email, a.name, a.roll_no, roll_no, b.name, b.email
        ))),
        (Some(student), _) | (None, Some(student)) => Ok(Some(student)),
        (None, None) => Ok(None),
    }
}

async fn apply_row(
    tx: &mut dyn RosterTx,
    vendors: &VendorIndex,
    row: &RosterRow,
    options: &ReconcileOptions,
) -> Result<AppliedRow, RowError> {
    let email = normalize_email(&row.email);
    let existing = find_existing(tx, &email, &row.roll_no).await?;

    let (vendor_id, new_vendor) = match vendors.resolve(&row.vendor) {
        VendorMatch::Found(id) => (id, None),
        VendorMatch::Ambiguous(n) => {
            return Err(RowError::Invalid(format!(
                "vendor '{}' matches {n} existing vendors",
                row.vendor
            )))
        }
        VendorMatch::Missing => {
            let location = row.location.as_deref().unwrap_or(&options.default_location);
            let vendor = tx.upsert_vendor(&row.vendor, location).await?;
            (vendor.id, Some(vendor))
        }
    };

    let outcome = match existing {
        Some(student) => {
            let changes = changes_for(&student, row, &email, vendor_id);
            if changes.is_empty() {
                RowOutcome::Unchanged
            } else {
                tx.update_student(student.id, &changes).await?;
                RowOutcome::Updated
            }
        }
        None => {
            let student = NewStudent {
                name: row.name.clone(),
                email,
                roll_no: row.roll_no.clone(),
                vendor_id,
                qr_code: qr::new_token(),
            };
            tx.insert_student(&student).await?;
            RowOutcome::Created
        }
    };

    Ok(AppliedRow { outcome, new_vendor })
}

/// Bring the student registry into agreement with `rows`.
///
/// Row failures land in the report. An `Err` means the store itself failed; if that happens
/// during the first phase nothing from this run is visible.
pub async fn reconcile(
    store: &dyn RosterStore,
    rows: &[RosterRow],
    options: &ReconcileOptions,
) -> Result<ReconciliationReport, DatabaseError> {
    let mut report = ReconciliationReport::new(rows.len());
    let mut roster_emails = HashSet::new();
    let mut seen = SeenRows::default();

    let mut tx = store.begin().await?;
    let mut vendors = VendorIndex::new(&tx.active_vendors().await?);
    info!("Reconciling {} roster rows against {} active vendors", rows.len(), vendors.len());

    for row in rows {
        // A row that fails later still shields its student from the sweep
        if is_institutional_email(&row.email, &options.email_domain) {
            roster_emails.insert(normalize_email(&row.email));
        }

        if let Err(reason) = validate(row, options) {
            warn!("Roster row {} rejected: {}", row.line, reason);
            report.record_error(row.line, &reason, options.max_reported_errors);
            continue;
        }

        let email = normalize_email(&row.email);
        if let Err(reason) = seen.check(&email, &row.roll_no) {
            warn!("Roster row {} rejected: {}", row.line, reason);
            report.record_error(row.line, &reason, options.max_reported_errors);
            continue;
        }

        tx.savepoint().await?;
        match apply_row(&mut *tx, &vendors, row, options).await {
            Ok(applied) => {
                tx.release_savepoint().await?;
                seen.record(row.line, email, &row.roll_no);
                if let Some(vendor) = applied.new_vendor {
                    info!("Created vendor '{}' from roster row {}", vendor.name, row.line);
                    vendors.insert(&vendor);
                    report.vendors_created += 1;
                }
                debug!("Roster row {}: {:?}", row.line, applied.outcome);
                report.record(applied.outcome);
            }
            Err(err) => {
                tx.rollback_to_savepoint().await?;
                if let RowError::Store(cause) = &err {
                    warn!("Roster row {} failed to persist: {}", row.line, cause);
                } else {
                    warn!("Roster row {} rejected: {}", row.line, err.reason());
                }
                report.record_error(row.line, &err.reason(), options.max_reported_errors);
            }
        }
    }

    tx.commit().await?;

    if roster_emails.is_empty() {
        warn!("Roster contained no usable emails; skipping deactivation sweep");
        report.deactivation_skipped = true;
    } else {
        report.deactivated = deactivate_absent(store, &roster_emails).await?;
    }

    info!(
        "Roster reconciled: {} processed ({} created, {} updated, {} unchanged), {} errors, {} deactivated",
        report.processed, report.created, report.updated, report.unchanged, report.error_count, report.deactivated
    );
    Ok(report)
}

async fn deactivate_absent(store: &dyn RosterStore, roster_emails: &HashSet<String>) -> Result<u64, DatabaseError> {
    let mut tx = store.begin().await?;
    let absent: Vec<Uuid> = tx
        .active_students()
        .await?
        .into_iter()
        .filter(|student| !roster_emails.contains(&normalize_email(&student.email)))
        .map(|student| student.id)
        .collect();

    let deactivated = tx.deactivate_students(&absent).await?;
    tx.commit().await?;
    Ok(deactivated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    fn options() -> ReconcileOptions {
        ReconcileOptions {
            email_domain: "inst.edu".to_string(),
            default_location: "TBD".to_string(),
            max_reported_errors: 10,
        }
    }

    fn row(line: u64, name: &str, email: &str, roll_no: &str, vendor: &str) -> RosterRow {
        RosterRow {
            line,
            name: name.to_string(),
            email: email.to_string(),
            roll_no: roll_no.to_string(),
            vendor: vendor.to_string(),
            location: None,
        }
    }

    fn jane() -> RosterRow {
        row(2, "Jane Doe", "jane@inst.edu", "2024002", "Cafeteria B")
    }

    #[tokio::test]
    async fn imports_new_student_and_vendor() {
        let store = MemoryStore::new();
        let report = reconcile(&store, &[jane()], &options()).await.unwrap();

        assert_eq!(report.total_rows, 1);
        assert_eq!(report.processed, 1);
        assert_eq!(report.created, 1);
        assert_eq!(report.vendors_created, 1);
        assert_eq!(report.error_count, 0);

        let student = store.student_by_email("jane@inst.edu").unwrap();
        assert!(student.is_active);
        assert!(student.qr_code.starts_with("MP-"));
        let vendor = store.vendor(student.vendor_id).unwrap();
        assert_eq!(vendor.name, "Cafeteria B");
        assert_eq!(vendor.location, "TBD");
    }

    #[tokio::test]
    async fn empty_roster_deactivates_nobody() {
        let store = MemoryStore::new();
        reconcile(&store, &[jane()], &options()).await.unwrap();

        let report = reconcile(&store, &[], &options()).await.unwrap();
        assert!(report.deactivation_skipped);
        assert_eq!(report.deactivated, 0);
        assert!(store.student_by_email("jane@inst.edu").unwrap().is_active);
    }

    #[tokio::test]
    async fn roster_without_valid_emails_deactivates_nobody() {
        let store = MemoryStore::new();
        reconcile(&store, &[jane()], &options()).await.unwrap();

        let rows = vec![row(2, "Eve", "eve@gmail.com", "2024009", "Cafeteria B")];
        let report = reconcile(&store, &rows, &options()).await.unwrap();
        assert_eq!(report.error_count, 1);
        assert!(report.deactivation_skipped);
        assert!(store.student_by_email("jane@inst.edu").unwrap().is_active);
    }

    #[tokio::test]
    async fn reimport_is_idempotent() {
        let store = MemoryStore::new();
        let rows = vec![
            jane(),
            row(3, "John Roe", "john@inst.edu", "2024003", "Uniworld"),
        ];
        reconcile(&store, &rows, &options()).await.unwrap();
        let before = store.students();

        let report = reconcile(&store, &rows, &options()).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.unchanged, 2);
        assert_eq!(report.created, 0);
        assert_eq!(report.vendors_created, 0);
        assert_eq!(report.deactivated, 0);
        assert_eq!(store.students(), before);
    }

    #[tokio::test]
    async fn absent_students_are_deactivated() {
        let store = MemoryStore::new();
        let john = row(3, "John Roe", "john@inst.edu", "2024003", "Uniworld");
        reconcile(&store, &[jane(), john], &options()).await.unwrap();

        let report = reconcile(&store, &[jane()], &options()).await.unwrap();
        assert_eq!(report.deactivated, 1);
        assert!(!store.student_by_email("john@inst.edu").unwrap().is_active);
        assert!(store.student_by_email("jane@inst.edu").unwrap().is_active);
    }

    #[tokio::test]
    async fn reimport_reactivates_and_keeps_qr_token() {
        let store = MemoryStore::new();
        let john = row(3, "John Roe", "john@inst.edu", "2024003", "Uniworld");
        reconcile(&store, &[jane(), john.clone()], &options()).await.unwrap();
        let token = store.student_by_email("john@inst.edu").unwrap().qr_code;

        reconcile(&store, &[jane()], &options()).await.unwrap();
        let report = reconcile(&store, &[jane(), john], &options()).await.unwrap();
        assert_eq!(report.updated, 1);

        let john = store.student_by_email("john@inst.edu").unwrap();
        assert!(john.is_active);
        assert_eq!(john.qr_code, token);
    }

    #[tokio::test]
    async fn vendor_names_dedup_across_case_and_whitespace() {
        let store = MemoryStore::new();
        let rows = vec![
            row(2, "A", "a@inst.edu", "1", "Uniworld "),
            row(3, "B", "b@inst.edu", "2", "uniworld"),
            row(4, "C", "c@inst.edu", "3", "  UNIWORLD"),
        ];
        let report = reconcile(&store, &rows, &options()).await.unwrap();
        assert_eq!(report.vendors_created, 1);
        assert_eq!(store.vendors().len(), 1);

        let vendor_ids: HashSet<Uuid> = store.students().iter().map(|s| s.vendor_id).collect();
        assert_eq!(vendor_ids.len(), 1);
    }

    #[tokio::test]
    async fn vendor_resolves_by_unique_substring() {
        let store = MemoryStore::new();
        let main = store.seed_vendor("Uniworld Main Canteen", "East Wing");
        let report = reconcile(&store, &[row(2, "A", "a@inst.edu", "1", "uniworld")], &options())
            .await
            .unwrap();

        assert_eq!(report.vendors_created, 0);
        assert_eq!(store.student_by_email("a@inst.edu").unwrap().vendor_id, main.id);
    }

    #[tokio::test]
    async fn ambiguous_vendor_is_a_row_error() {
        let store = MemoryStore::new();
        store.seed_vendor("Cafeteria A", "North");
        store.seed_vendor("Cafeteria B", "South");

        let report = reconcile(&store, &[row(2, "A", "a@inst.edu", "1", "cafeteria")], &options())
            .await
            .unwrap();
        assert_eq!(report.error_count, 1);
        assert!(report.errors[0].starts_with("Row 2: vendor 'cafeteria' matches 2"));
        assert!(store.students().is_empty());
        assert_eq!(store.vendors().len(), 2);
    }

    #[tokio::test]
    async fn auto_created_vendor_uses_row_location() {
        let store = MemoryStore::new();
        let mut first = jane();
        first.location = Some("North Block".to_string());
        reconcile(&store, &[first], &options()).await.unwrap();

        let vendor = &store.vendors()[0];
        assert_eq!(vendor.location, "North Block");
    }

    #[tokio::test]
    async fn invalid_rows_are_reported_and_skipped() {
        let store = MemoryStore::new();
        let rows = vec![
            row(2, "", "nobody@inst.edu", "1", "Uniworld"),
            row(3, "Eve", "eve@gmail.com", "2", "Uniworld"),
            jane(),
            row(5, "Sam", "sam@inst.edu", "", ""),
        ];
        let report = reconcile(&store, &rows, &options()).await.unwrap();

        assert_eq!(report.total_rows, 4);
        assert_eq!(report.processed, 1);
        assert_eq!(report.error_count, 3);
        assert_eq!(report.errors[0], "Row 2: missing name");
        assert!(report.errors[1].starts_with("Row 3: email 'eve@gmail.com'"));
        assert_eq!(report.errors[2], "Row 5: missing roll number, vendor");
        assert_eq!(store.students().len(), 1);
    }

    #[tokio::test]
    async fn error_messages_are_capped() {
        let store = MemoryStore::new();
        let rows: Vec<RosterRow> = (0..15)
            .map(|i| row(i + 2, "X", "x@elsewhere.org", &i.to_string(), "V"))
            .collect();
        let report = reconcile(&store, &rows, &options()).await.unwrap();
        assert_eq!(report.error_count, 15);
        assert_eq!(report.errors.len(), 10);
    }

    #[tokio::test]
    async fn conflicting_identifiers_leave_both_records_alone() {
        let store = MemoryStore::new();
        let rows = vec![
            jane(),
            row(3, "John Roe", "john@inst.edu", "2024003", "Cafeteria B"),
        ];
        reconcile(&store, &rows, &options()).await.unwrap();
        let before = store.students();

        let clash = row(2, "Jane Doe", "jane@inst.edu", "2024003", "Uniworld");
        let report = reconcile(&store, &[clash, rows[1].clone()], &options()).await.unwrap();

        assert_eq!(report.error_count, 1);
        assert!(report.errors[0].contains("conflicting identifiers"));
        assert_eq!(report.vendors_created, 0);
        assert_eq!(store.vendors().len(), 1);
        // Jane's email was in the roster, so the sweep leaves her active
        assert_eq!(report.deactivated, 0);
        assert_eq!(store.students(), before);
    }

    #[tokio::test]
    async fn single_identifier_match_updates_the_record() {
        let store = MemoryStore::new();
        reconcile(&store, &[jane()], &options()).await.unwrap();
        let original = store.student_by_email("jane@inst.edu").unwrap();

        // Same roll number, new email
        let moved = row(2, "Jane Doe", "jane.doe@inst.edu", "2024002", "Cafeteria B");
        let report = reconcile(&store, &[moved], &options()).await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.deactivated, 0);

        let updated = store.student_by_email("jane.doe@inst.edu").unwrap();
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.qr_code, original.qr_code);
        assert_eq!(store.students().len(), 1);
    }

    #[tokio::test]
    async fn vendor_reassignment_updates_student() {
        let store = MemoryStore::new();
        reconcile(&store, &[jane()], &options()).await.unwrap();

        let moved = row(2, "Jane Doe", "jane@inst.edu", "2024002", "Uniworld");
        let report = reconcile(&store, &[moved], &options()).await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.vendors_created, 1);

        let student = store.student_by_email("jane@inst.edu").unwrap();
        assert_eq!(store.vendor(student.vendor_id).unwrap().name, "Uniworld");
    }

    #[tokio::test]
    async fn persistence_failure_is_row_scoped() {
        let store = MemoryStore::new();
        store.fail_inserts_for("broken@inst.edu");

        let rows = vec![
            row(2, "Broken", "broken@inst.edu", "1", "Ghost Kitchen"),
            jane(),
        ];
        let report = reconcile(&store, &rows, &options()).await.unwrap();

        assert_eq!(report.processed, 1);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors[0], "Row 2: could not be saved");
        // "Ghost Kitchen" was only created inside the failed row's savepoint
        assert_eq!(report.vendors_created, 1);
        let names: Vec<String> = store.vendors().into_iter().map(|v| v.name).collect();
        assert_eq!(names, vec!["Cafeteria B".to_string()]);
    }

    #[tokio::test]
    async fn roll_number_repeated_within_roster_is_rejected() {
        let store = MemoryStore::new();
        let rows = vec![
            jane(),
            row(3, "Impostor", "imp@inst.edu", "2024002", "Cafeteria B"),
        ];
        let report = reconcile(&store, &rows, &options()).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.updated, 0);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors[0], "Row 3: duplicate roll number in roster, also on row 2");

        let students = store.students();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].name, "Jane Doe");
        assert_eq!(students[0].email, "jane@inst.edu");
    }

    #[tokio::test]
    async fn email_repeated_within_roster_is_rejected() {
        let store = MemoryStore::new();
        let rows = vec![
            jane(),
            row(3, "Jane Again", "JANE@inst.edu", "2024999", "Cafeteria B"),
        ];
        let report = reconcile(&store, &rows, &options()).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors[0], "Row 3: duplicate email in roster, also on row 2");
        let jane = store.student_by_email("jane@inst.edu").unwrap();
        assert_eq!(jane.roll_no, "2024002");
    }

    #[tokio::test]
    async fn failed_row_does_not_claim_its_identifiers() {
        let store = MemoryStore::new();
        store.fail_inserts_for("broken@inst.edu");
        let rows = vec![
            row(2, "Broken", "broken@inst.edu", "2024002", "Cafeteria B"),
            jane(),
        ];
        let report = reconcile(&store, &rows, &options()).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.errors, vec!["Row 2: could not be saved".to_string()]);
        assert!(store.student_by_email("jane@inst.edu").is_some());
    }

    #[tokio::test]
    async fn inactive_vendor_is_reactivated_not_duplicated() {
        let store = MemoryStore::new();
        let cafeteria = store.seed_vendor("Cafeteria B", "North Block").id;
        store.set_vendor_active(cafeteria, false);

        let report = reconcile(&store, &[jane()], &options()).await.unwrap();

        assert_eq!(report.created, 1);
        assert_eq!(report.vendors_created, 1);
        let vendors = store.vendors();
        assert_eq!(vendors.len(), 1);
        assert!(vendors[0].is_active);
        assert_eq!(store.student_by_email("jane@inst.edu").unwrap().vendor_id, cafeteria);
    }

    #[tokio::test]
    async fn reactivation_matches_vendor_names_differing_in_spacing() {
        let store = MemoryStore::new();
        let legacy = store.seed_vendor("Cafeteria  B", "North Block").id;
        store.set_vendor_active(legacy, false);

        let report = reconcile(&store, &[jane()], &options()).await.unwrap();

        assert_eq!(report.error_count, 0);
        let vendors = store.vendors();
        assert_eq!(vendors.len(), 1);
        assert!(vendors[0].is_active);
        assert_eq!(store.student_by_email("jane@inst.edu").unwrap().vendor_id, legacy);
    }
}
