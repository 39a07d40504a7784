//! Read-only aggregates behind the vendor dashboard and the admin/verification stats.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::Vendor;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ClaimHistoryItem {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub roll_no: String,
    pub meal_date: NaiveDate,
    pub meal_type: String,
    pub claimed_at: DateTime<Utc>,
    pub claimed_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorDashboard {
    pub vendor: Vendor,
    pub date: NaiveDate,
    pub assigned_students: i64,
    pub claimed_today: i64,
    pub remaining: i64,
    pub recent_claims: Vec<ClaimHistoryItem>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStats {
    pub vendor_id: Uuid,
    pub date: NaiveDate,
    pub claimed_today: i64,
    pub assigned_students: i64,
    pub last_seven_days: Vec<DailyCount>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VendorClaimCount {
    pub vendor_id: Uuid,
    pub vendor_name: String,
    pub assigned_students: i64,
    pub claimed_today: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub date: NaiveDate,
    pub total_students: i64,
    pub active_students: i64,
    pub inactive_students: i64,
    pub active_vendors: i64,
    pub claims_today: i64,
    pub vendors: Vec<VendorClaimCount>,
}

const HISTORY_SQL: &str = "SELECT m.id, m.student_id, s.name AS student_name, s.roll_no, m.meal_date, \
     m.meal_type, m.claimed_at, m.claimed_by \
     FROM meal_records m JOIN students s ON s.id = m.student_id \
     WHERE m.vendor_id = $1 AND m.meal_date = $2 AND m.claimed \
     ORDER BY m.claimed_at DESC LIMIT $3";

pub async fn claim_history(
    pool: &PgPool,
    vendor_id: Uuid,
    date: NaiveDate,
    limit: i64,
) -> Result<Vec<ClaimHistoryItem>, DatabaseError> {
    let items = sqlx::query_as::<_, ClaimHistoryItem>(HISTORY_SQL)
        .bind(vendor_id)
        .bind(date)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

async fn assigned_students(pool: &PgPool, vendor_id: Uuid) -> Result<i64, DatabaseError> {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM students WHERE vendor_id = $1 AND is_active")
            .bind(vendor_id)
            .fetch_one(pool)
            .await?;
    Ok(count)
}

async fn claims_on(pool: &PgPool, vendor_id: Uuid, date: NaiveDate) -> Result<i64, DatabaseError> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM meal_records WHERE vendor_id = $1 AND meal_date = $2 AND claimed",
    )
    .bind(vendor_id)
    .bind(date)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

pub async fn vendor_dashboard(pool: &PgPool, vendor: Vendor, date: NaiveDate) -> Result<VendorDashboard, DatabaseError> {
    let (assigned, claimed, recent) = tokio::try_join!(
        assigned_students(pool, vendor.id),
        claims_on(pool, vendor.id, date),
        claim_history(pool, vendor.id, date, 10),
    )?;

    Ok(VendorDashboard {
        vendor,
        date,
        assigned_students: assigned,
        claimed_today: claimed,
        remaining: (assigned - claimed).max(0),
        recent_claims: recent,
    })
}

async fn daily_counts(pool: &PgPool, vendor_id: Uuid, date: NaiveDate) -> Result<Vec<DailyCount>, DatabaseError> {
    // generate_series keeps days without claims in the output
    let counts = sqlx::query_as::<_, DailyCount>(
        "SELECT d::date AS date, COUNT(m.id) AS count \
         FROM generate_series($2::date - 6, $2::date, interval '1 day') AS d \
         LEFT JOIN meal_records m ON m.meal_date = d::date AND m.vendor_id = $1 AND m.claimed \
         GROUP BY d ORDER BY d",
    )
    .bind(vendor_id)
    .bind(date)
    .fetch_all(pool)
    .await?;
    Ok(counts)
}

pub async fn claim_stats(pool: &PgPool, vendor_id: Uuid, date: NaiveDate) -> Result<ClaimStats, DatabaseError> {
    let (claimed, assigned, daily) = tokio::try_join!(
        claims_on(pool, vendor_id, date),
        assigned_students(pool, vendor_id),
        daily_counts(pool, vendor_id, date),
    )?;

    Ok(ClaimStats {
        vendor_id,
        date,
        claimed_today: claimed,
        assigned_students: assigned,
        last_seven_days: daily,
    })
}

pub async fn admin_stats(pool: &PgPool, date: NaiveDate) -> Result<AdminStats, DatabaseError> {
    let (total, active): (i64, i64) =
        sqlx::query_as("SELECT COUNT(*), COUNT(*) FILTER (WHERE is_active) FROM students")
            .fetch_one(pool)
            .await?;
    let (active_vendors,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vendors WHERE is_active")
        .fetch_one(pool)
        .await?;
    let (claims_today,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM meal_records WHERE meal_date = $1 AND claimed")
            .bind(date)
            .fetch_one(pool)
            .await?;
    let vendors = sqlx::query_as::<_, VendorClaimCount>(
        "SELECT v.id AS vendor_id, v.name AS vendor_name, \
         (SELECT COUNT(*) FROM students s WHERE s.vendor_id = v.id AND s.is_active) AS assigned_students, \
         (SELECT COUNT(*) FROM meal_records m WHERE m.vendor_id = v.id AND m.meal_date = $1 AND m.claimed) AS claimed_today \
         FROM vendors v WHERE v.is_active ORDER BY v.name",
    )
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok(AdminStats {
        date,
        total_students: total,
        active_students: active,
        inactive_students: total - active,
        active_vendors,
        claims_today,
        vendors,
    })
}
