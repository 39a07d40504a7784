use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Entry appended to a student's meal history on every successful claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealHistoryEntry {
    pub date: NaiveDate,
    pub vendor_id: Uuid,
    pub claimed: bool,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub vendor_id: Uuid,
    pub is_active: bool,
    /// Written once at creation, never regenerated.
    pub qr_code: String,
    pub last_claim_date: Option<NaiveDate>,
    pub last_claim_vendor_id: Option<Uuid>,
    pub meal_history: Json<Vec<MealHistoryEntry>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Student {
    pub fn summary(&self, vendor_name: Option<String>) -> StudentSummary {
        StudentSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            roll_no: self.roll_no.clone(),
            vendor_id: self.vendor_id,
            vendor_name,
        }
    }
}

/// Display fields returned to vendor staff during verification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub vendor_id: Uuid,
    pub vendor_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub name: String,
    pub email: String,
    pub roll_no: String,
    pub vendor_id: Uuid,
    pub qr_code: String,
}

/// Mutable student fields. `None` leaves the column untouched; the QR token has no slot here.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub roll_no: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl StudentChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.roll_no.is_none()
            && self.vendor_id.is_none()
            && self.is_active.is_none()
    }
}

/// Institutional email rule: exactly one `@`, non-empty local part, domain equal to `domain`.
pub fn is_institutional_email(email: &str, domain: &str) -> bool {
    let email = email.trim().to_lowercase();
    let domain = domain.trim().trim_start_matches('@').to_lowercase();
    match email.split_once('@') {
        Some((local, host)) => {
            !local.is_empty() && !host.contains('@') && !local.contains(char::is_whitespace) && host == domain
        }
        None => false,
    }
}

/// Canonical stored form of an email
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn institutional_email_rule() {
        assert!(is_institutional_email("jane@inst.edu", "inst.edu"));
        assert!(is_institutional_email(" Jane@INST.edu ", "@inst.edu"));
        assert!(!is_institutional_email("jane@gmail.com", "inst.edu"));
        assert!(!is_institutional_email("jane@sub.inst.edu", "inst.edu"));
        assert!(!is_institutional_email("@inst.edu", "inst.edu"));
        assert!(!is_institutional_email("jane@@inst.edu", "inst.edu"));
        assert!(!is_institutional_email("jane doe@inst.edu", "inst.edu"));
        assert!(!is_institutional_email("jane", "inst.edu"));
    }

    #[test]
    fn empty_changes() {
        assert!(StudentChanges::default().is_empty());
        let changes = StudentChanges {
            is_active: Some(false),
            ..Default::default()
        };
        assert!(!changes.is_empty());
    }
}
