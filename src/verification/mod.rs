//! Meal-claim verification: resolve a student, check vendor assignment and today's claim,
//! then record the claim. The unique index on claimed meal records is the final gate; a
//! write that loses the race reports the winning claim instead of failing.

use axum::http::StatusCode;
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{MealRecord, NewClaim, Student, StudentSummary, DEFAULT_MEAL_TYPE};
use crate::database::store::ClaimStore;

/// Server-local calendar day, `[starts_at, ends_at)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimWindow {
    pub date: NaiveDate,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

impl ClaimWindow {
    pub fn containing(now: DateTime<Utc>) -> Self {
        let date = now.with_timezone(&Local).date_naive();
        let next = date.succ_opt().unwrap_or(date);
        Self {
            date,
            starts_at: local_midnight(date),
            ends_at: local_midnight(next),
        }
    }

    pub fn today() -> Self {
        Self::containing(Utc::now())
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.starts_at <= at && at < self.ends_at
    }
}

/// Terminal state of one verification attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Verification {
    NotFound,
    WrongVendor {
        student: StudentSummary,
        assigned_vendor: Option<String>,
    },
    AlreadyClaimed {
        student: StudentSummary,
        claimed_at: DateTime<Utc>,
    },
    Claimed {
        student: StudentSummary,
        record: MealRecord,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    NotFound,
    WrongVendor,
    AlreadyClaimed,
    Claimed,
}

/// Wire shape of a verification outcome
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    pub verified: bool,
    pub already_claimed: bool,
    pub status: VerificationStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claimed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_record_id: Option<Uuid>,
}

impl Verification {
    pub fn is_verified(&self) -> bool {
        matches!(self, Verification::Claimed { .. })
    }

    pub fn status(&self) -> VerificationStatus {
        match self {
            Verification::NotFound => VerificationStatus::NotFound,
            Verification::WrongVendor { .. } => VerificationStatus::WrongVendor,
            Verification::AlreadyClaimed { .. } => VerificationStatus::AlreadyClaimed,
            Verification::Claimed { .. } => VerificationStatus::Claimed,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Verification::NotFound => StatusCode::NOT_FOUND,
            Verification::WrongVendor { .. } => StatusCode::FORBIDDEN,
            Verification::AlreadyClaimed { .. } => StatusCode::CONFLICT,
            Verification::Claimed { .. } => StatusCode::OK,
        }
    }

    pub fn into_result(self) -> VerificationResult {
        let status = self.status();
        let mut result = VerificationResult {
            verified: self.is_verified(),
            already_claimed: status == VerificationStatus::AlreadyClaimed,
            status,
            message: String::new(),
            student: None,
            assigned_vendor: None,
            claimed_at: None,
            meal_record_id: None,
        };

        match self {
            Verification::NotFound => {
                result.message = "No active student matches this identifier".to_string();
            }
            Verification::WrongVendor {
                student,
                assigned_vendor,
            } => {
                result.message = match &assigned_vendor {
                    Some(name) => format!("Student is assigned to {name}"),
                    None => "Student is assigned to a different vendor".to_string(),
                };
                result.student = Some(student);
                result.assigned_vendor = assigned_vendor;
            }
            Verification::AlreadyClaimed { student, claimed_at } => {
                result.message = "Meal already claimed today".to_string();
                result.student = Some(student);
                result.claimed_at = Some(claimed_at);
            }
            Verification::Claimed { student, record } => {
                result.message = "Meal verified".to_string();
                result.student = Some(student);
                result.claimed_at = Some(record.claimed_at);
                result.meal_record_id = Some(record.id);
            }
        }
        result
    }
}

async fn summarize(store: &dyn ClaimStore, student: &Student) -> Result<StudentSummary, DatabaseError> {
    let vendor = store.find_vendor(student.vendor_id).await?;
    Ok(student.summary(vendor.map(|v| v.name)))
}

/// Verify `identifier` (QR token, roll number or email) for a meal at `vendor_id`, claimed by
/// `principal`, at the current time.
pub async fn verify(
    store: &dyn ClaimStore,
    identifier: &str,
    vendor_id: Uuid,
    principal: Option<Uuid>,
) -> Result<Verification, DatabaseError> {
    verify_at(store, identifier, vendor_id, principal, Utc::now()).await
}

pub async fn verify_at(
    store: &dyn ClaimStore,
    identifier: &str,
    vendor_id: Uuid,
    principal: Option<Uuid>,
    now: DateTime<Utc>,
) -> Result<Verification, DatabaseError> {
    let identifier = identifier.trim();
    let Some(student) = store.find_active_student(identifier).await? else {
        debug!("Verification at vendor {}: no active student for '{}'", vendor_id, identifier);
        return Ok(Verification::NotFound);
    };

    let summary = summarize(store, &student).await?;
    if student.vendor_id != vendor_id {
        debug!("Student {} is assigned to vendor {}, not {}", student.id, student.vendor_id, vendor_id);
        let assigned_vendor = summary.vendor_name.clone();
        return Ok(Verification::WrongVendor {
            student: summary,
            assigned_vendor,
        });
    }

    let window = ClaimWindow::containing(now);
    if let Some(existing) = store.find_claim(student.id, window.date, DEFAULT_MEAL_TYPE).await? {
        return Ok(Verification::AlreadyClaimed {
            student: summary,
            claimed_at: existing.claimed_at,
        });
    }

    let claim = NewClaim {
        student_id: student.id,
        vendor_id,
        meal_date: window.date,
        meal_type: DEFAULT_MEAL_TYPE.to_string(),
        claimed_at: now,
        claimed_by: principal,
    };

    match store.record_claim(&claim).await {
        Ok(record) => {
            info!("Meal claimed for student {} at vendor {}", student.id, vendor_id);
            Ok(Verification::Claimed {
                student: summary,
                record,
            })
        }
        Err(err) if err.is_unique_violation() => {
            info!("Concurrent claim for student {} on {}; reporting the earlier claim", student.id, window.date);
            let existing = store
                .find_claim(student.id, window.date, DEFAULT_MEAL_TYPE)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("claim for student {}", student.id)))?;
            Ok(Verification::AlreadyClaimed {
                student: summary,
                claimed_at: existing.claimed_at,
            })
        }
        Err(err) => Err(err),
    }
}
