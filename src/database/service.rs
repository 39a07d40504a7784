use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{tidy_vendor_name, MealRecord, NewStudent, Role, Student, User, Vendor};
use crate::database::repository::{self, MEAL_RECORD_COLUMNS, STUDENT_COLUMNS, VENDOR_COLUMNS};

/// Qualify a comma-separated column list with a table alias
pub(crate) fn prefixed(columns: &str, alias: &str) -> String {
    columns
        .split(',')
        .map(|c| format!("{alias}.{}", c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Student with the display name of its vendor
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StudentListItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub student: Student,
    pub vendor_name: Option<String>,
    pub vendor_location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub search: Option<String>,
    pub vendor_id: Option<Uuid>,
    pub active: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl StudentQuery {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 200;
    pub const MAX_PAGE: i64 = 1_000_000;

    /// Rejects page numbers past `MAX_PAGE`; smaller values are clamped instead
    pub fn check_page(&self) -> Result<(), String> {
        match self.page {
            Some(page) if page > Self::MAX_PAGE => Err(format!("must be at most {}", Self::MAX_PAGE)),
            _ => Ok(()),
        }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).clamp(1, Self::MAX_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT).clamp(1, Self::MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPage {
    pub students: Vec<StudentListItem>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

fn push_student_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &StudentQuery) {
    builder.push(" WHERE TRUE");
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (s.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR s.roll_no ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(vendor_id) = query.vendor_id {
        builder.push(" AND s.vendor_id = ").push_bind(vendor_id);
    }
    if let Some(active) = query.active {
        builder.push(" AND s.is_active = ").push_bind(active);
    }
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

pub async fn list_students(pool: &PgPool, query: &StudentQuery) -> Result<StudentPage, DatabaseError> {
    let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students s");
    push_student_filters(&mut count, query);
    let (total,): (i64,) = count.build_query_as().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Postgres>::new(format!(
        "SELECT {}, v.name AS vendor_name, v.location AS vendor_location FROM students s LEFT JOIN vendors v ON v.id = s.vendor_id",
        prefixed(STUDENT_COLUMNS, "s")
    ));
    push_student_filters(&mut select, query);
    select
        .push(" ORDER BY s.roll_no LIMIT ")
        .push_bind(query.limit())
        .push(" OFFSET ")
        .push_bind(query.offset());
    let students = select.build_query_as::<StudentListItem>().fetch_all(pool).await?;

    Ok(StudentPage {
        students,
        total,
        page: query.page(),
        limit: query.limit(),
    })
}

pub async fn get_student(pool: &PgPool, id: Uuid) -> Result<StudentListItem, DatabaseError> {
    let sql = format!(
        "SELECT {}, v.name AS vendor_name, v.location AS vendor_location FROM students s LEFT JOIN vendors v ON v.id = s.vendor_id WHERE s.id = $1",
        prefixed(STUDENT_COLUMNS, "s")
    );
    sqlx::query_as::<_, StudentListItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Student {id} not found")))
}

/// Lookup by QR token, roll number or email, including inactive students
pub async fn search_student(pool: &PgPool, identifier: &str) -> Result<Option<StudentListItem>, DatabaseError> {
    let sql = format!(
        "SELECT {}, v.name AS vendor_name, v.location AS vendor_location FROM students s LEFT JOIN vendors v ON v.id = s.vendor_id \
         WHERE s.qr_code = $1 OR s.roll_no = $1 OR lower(s.email) = lower($1) \
         ORDER BY s.is_active DESC, (s.qr_code = $1) DESC, (s.roll_no = $1) DESC \
         LIMIT 1",
        prefixed(STUDENT_COLUMNS, "s")
    );
    let student = sqlx::query_as::<_, StudentListItem>(&sql)
        .bind(identifier.trim())
        .fetch_optional(pool)
        .await?;
    Ok(student)
}

pub async fn search_vendor_students(
    pool: &PgPool,
    vendor_id: Uuid,
    term: &str,
    limit: i64,
) -> Result<Vec<StudentListItem>, DatabaseError> {
    let query = StudentQuery {
        search: Some(term.to_string()),
        vendor_id: Some(vendor_id),
        active: Some(true),
        page: Some(1),
        limit: Some(limit),
    };
    Ok(list_students(pool, &query).await?.students)
}

pub async fn student_meals(pool: &PgPool, student_id: Uuid) -> Result<Vec<MealRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {MEAL_RECORD_COLUMNS} FROM meal_records WHERE student_id = $1 ORDER BY claimed_at DESC"
    );
    let records = sqlx::query_as::<_, MealRecord>(&sql).bind(student_id).fetch_all(pool).await?;
    Ok(records)
}

pub async fn deactivate_students(pool: &PgPool, ids: &[Uuid]) -> Result<u64, DatabaseError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let result = sqlx::query(
        "UPDATE students SET is_active = FALSE, updated_at = NOW() WHERE id = ANY($1) AND is_active",
    )
    .bind(ids)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}

/// Every student in roster column order, for CSV export
pub async fn export_students(pool: &PgPool) -> Result<Vec<StudentListItem>, DatabaseError> {
    let sql = format!(
        "SELECT {}, v.name AS vendor_name, v.location AS vendor_location FROM students s LEFT JOIN vendors v ON v.id = s.vendor_id ORDER BY s.roll_no",
        prefixed(STUDENT_COLUMNS, "s")
    );
    let students = sqlx::query_as::<_, StudentListItem>(&sql).fetch_all(pool).await?;
    Ok(students)
}

// ---------------------
//  Vendors
// ---------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewVendor {
    pub name: String,
    pub location: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorChanges {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn list_vendors(pool: &PgPool, include_inactive: bool) -> Result<Vec<Vendor>, DatabaseError> {
    let sql = format!(
        "SELECT {VENDOR_COLUMNS} FROM vendors WHERE is_active OR $1 ORDER BY name"
    );
    let vendors = sqlx::query_as::<_, Vendor>(&sql).bind(include_inactive).fetch_all(pool).await?;
    Ok(vendors)
}

pub async fn create_vendor(pool: &PgPool, vendor: &NewVendor, default_location: &str) -> Result<Vendor, DatabaseError> {
    let location = vendor
        .location
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(default_location);
    let sql = format!(
        "INSERT INTO vendors (id, name, location, contact, is_active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, TRUE, NOW(), NOW()) RETURNING {VENDOR_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Vendor>(&sql)
        .bind(Uuid::new_v4())
        .bind(tidy_vendor_name(&vendor.name))
        .bind(location)
        .bind(vendor.contact.as_deref())
        .fetch_one(pool)
        .await?;
    Ok(created)
}

pub async fn update_vendor(pool: &PgPool, id: Uuid, changes: &VendorChanges) -> Result<Vendor, DatabaseError> {
    let sql = format!(
        "UPDATE vendors SET \
         name = COALESCE($2, name), \
         location = COALESCE($3, location), \
         contact = COALESCE($4, contact), \
         is_active = COALESCE($5, is_active), \
         updated_at = NOW() \
         WHERE id = $1 RETURNING {VENDOR_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Vendor>(&sql)
        .bind(id)
        .bind(changes.name.as_deref().map(tidy_vendor_name))
        .bind(changes.location.as_deref())
        .bind(changes.contact.as_deref())
        .bind(changes.is_active)
        .fetch_optional(pool)
        .await?;
    updated.ok_or_else(|| DatabaseError::NotFound(format!("Vendor {id} not found")))
}

// ---------------------
//  Users
// ---------------------

const USER_COLUMNS: &str = "id, name, email, password_hash, role, vendor_id, is_active, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub vendor_id: Option<Uuid>,
}

pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
    let user = sqlx::query_as::<_, User>(&sql).bind(email.trim()).fetch_optional(pool).await?;
    Ok(user)
}

pub async fn find_user(pool: &PgPool, id: Uuid) -> Result<Option<User>, DatabaseError> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(user)
}

pub async fn insert_user<'e, E: PgExecutor<'e>>(executor: E, user: &NewUser) -> Result<User, DatabaseError> {
    let sql = format!(
        "INSERT INTO users (id, name, email, password_hash, role, vendor_id, is_active, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, TRUE, NOW(), NOW()) RETURNING {USER_COLUMNS}"
    );
    let created = sqlx::query_as::<_, User>(&sql)
        .bind(Uuid::new_v4())
        .bind(user.name.trim())
        .bind(user.email.trim().to_lowercase())
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.vendor_id)
        .fetch_one(executor)
        .await?;
    Ok(created)
}

/// Insert a user and, if given, their registry entry in one transaction.
///
/// The registry entry is skipped when a student with that email already exists. Any failure
/// leaves neither row behind.
pub async fn insert_user_with_student(
    pool: &PgPool,
    user: &NewUser,
    student: Option<&NewStudent>,
) -> Result<(User, Option<Student>), DatabaseError> {
    let mut tx = pool.begin().await?;
    let created = insert_user(&mut *tx, user).await?;

    let mut registered = None;
    if let Some(student) = student {
        if repository::find_student_by_email(&mut *tx, &student.email).await?.is_none() {
            registered = Some(repository::insert_student(&mut *tx, student).await?);
        }
    }

    tx.commit().await?;
    Ok((created, registered))
}
