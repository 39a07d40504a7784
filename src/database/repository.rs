use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{
    tidy_vendor_name, MealHistoryEntry, MealRecord, NewClaim, NewStudent, Student, StudentChanges, Vendor,
};
use crate::database::store::{ActiveStudent, ClaimStore, RosterStore, RosterTx};

pub(crate) const STUDENT_COLUMNS: &str = "id, name, email, roll_no, vendor_id, is_active, qr_code, \
     last_claim_date, last_claim_vendor_id, meal_history, created_at, updated_at";

pub(crate) const VENDOR_COLUMNS: &str = "id, name, location, contact, is_active, created_at, updated_at";

pub(crate) const MEAL_RECORD_COLUMNS: &str =
    "id, student_id, vendor_id, meal_date, meal_type, claimed, claimed_at, claimed_by";

/// Postgres-backed implementation of the storage seams
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

pub struct PgRosterTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RosterStore for PgRepository {
    async fn begin(&self) -> Result<Box<dyn RosterTx>, DatabaseError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgRosterTx { tx }))
    }
}

#[async_trait]
impl RosterTx for PgRosterTx {
    async fn active_vendors(&mut self) -> Result<Vec<Vendor>, DatabaseError> {
        let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE is_active ORDER BY name");
        let vendors = sqlx::query_as::<_, Vendor>(&sql).fetch_all(&mut *self.tx).await?;
        Ok(vendors)
    }

    async fn upsert_vendor(&mut self, name: &str, location: &str) -> Result<Vendor, DatabaseError> {
        let sql = format!(
            "INSERT INTO vendors (id, name, location, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, TRUE, NOW(), NOW()) \
             ON CONFLICT ((lower(regexp_replace(btrim(name), '\\s+', ' ', 'g')))) \
             DO UPDATE SET is_active = TRUE, updated_at = NOW() \
             RETURNING {VENDOR_COLUMNS}"
        );
        let vendor = sqlx::query_as::<_, Vendor>(&sql)
            .bind(Uuid::new_v4())
            .bind(tidy_vendor_name(name))
            .bind(location)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(vendor)
    }

    async fn find_student_by_email(&mut self, email: &str) -> Result<Option<Student>, DatabaseError> {
        find_student_by_email(&mut *self.tx, email).await
    }

    async fn find_student_by_roll_no(&mut self, roll_no: &str) -> Result<Option<Student>, DatabaseError> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE roll_no = $1");
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(roll_no)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(student)
    }

    async fn insert_student(&mut self, student: &NewStudent) -> Result<Student, DatabaseError> {
        insert_student(&mut *self.tx, student).await
    }

    async fn update_student(&mut self, id: Uuid, changes: &StudentChanges) -> Result<Student, DatabaseError> {
        let sql = format!("{UPDATE_STUDENT_SQL} RETURNING {STUDENT_COLUMNS}");
        let updated = bind_student_changes(sqlx::query_as::<_, Student>(&sql), id, changes)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(updated)
    }

    async fn active_students(&mut self) -> Result<Vec<ActiveStudent>, DatabaseError> {
        let rows: Vec<(Uuid, String)> = sqlx::query_as("SELECT id, email FROM students WHERE is_active")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(rows.into_iter().map(|(id, email)| ActiveStudent { id, email }).collect())
    }

    async fn deactivate_students(&mut self, ids: &[Uuid]) -> Result<u64, DatabaseError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE students SET is_active = FALSE, updated_at = NOW() WHERE id = ANY($1) AND is_active",
        )
        .bind(ids)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn savepoint(&mut self) -> Result<(), DatabaseError> {
        sqlx::query("SAVEPOINT roster_row").execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn rollback_to_savepoint(&mut self) -> Result<(), DatabaseError> {
        sqlx::query("ROLLBACK TO SAVEPOINT roster_row").execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn release_savepoint(&mut self) -> Result<(), DatabaseError> {
        sqlx::query("RELEASE SAVEPOINT roster_row").execute(&mut *self.tx).await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ClaimStore for PgRepository {
    async fn find_active_student(&self, identifier: &str) -> Result<Option<Student>, DatabaseError> {
        let sql = format!(
            "SELECT {STUDENT_COLUMNS} FROM students \
             WHERE is_active AND (qr_code = $1 OR roll_no = $1 OR lower(email) = lower($1)) \
             ORDER BY (qr_code = $1) DESC, (roll_no = $1) DESC \
             LIMIT 1"
        );
        let student = sqlx::query_as::<_, Student>(&sql)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        Ok(student)
    }

    async fn find_vendor(&self, id: Uuid) -> Result<Option<Vendor>, DatabaseError> {
        find_vendor(&self.pool, id).await
    }

    async fn find_claim(
        &self,
        student_id: Uuid,
        date: NaiveDate,
        meal_type: &str,
    ) -> Result<Option<MealRecord>, DatabaseError> {
        let sql = format!(
            "SELECT {MEAL_RECORD_COLUMNS} FROM meal_records \
             WHERE student_id = $1 AND meal_date = $2 AND meal_type = $3 AND claimed"
        );
        let record = sqlx::query_as::<_, MealRecord>(&sql)
            .bind(student_id)
            .bind(date)
            .bind(meal_type)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn record_claim(&self, claim: &NewClaim) -> Result<MealRecord, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO meal_records (id, student_id, vendor_id, meal_date, meal_type, claimed, claimed_at, claimed_by) \
             VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7) \
             RETURNING {MEAL_RECORD_COLUMNS}"
        );
        let record = sqlx::query_as::<_, MealRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(claim.student_id)
            .bind(claim.vendor_id)
            .bind(claim.meal_date)
            .bind(&claim.meal_type)
            .bind(claim.claimed_at)
            .bind(claim.claimed_by)
            .fetch_one(&mut *tx)
            .await?;

        let entry = MealHistoryEntry {
            date: claim.meal_date,
            vendor_id: claim.vendor_id,
            claimed: true,
            claimed_at: claim.claimed_at,
        };
        sqlx::query(
            "UPDATE students \
             SET meal_history = meal_history || $2, last_claim_date = $3, last_claim_vendor_id = $4, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(claim.student_id)
        .bind(Json(vec![entry]))
        .bind(claim.meal_date)
        .bind(claim.vendor_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }
}

pub(crate) const UPDATE_STUDENT_SQL: &str = "UPDATE students SET \
     name = COALESCE($2, name), \
     email = COALESCE($3, email), \
     roll_no = COALESCE($4, roll_no), \
     vendor_id = COALESCE($5, vendor_id), \
     is_active = COALESCE($6, is_active), \
     updated_at = NOW() \
     WHERE id = $1";

pub(crate) fn bind_student_changes<'q, O>(
    q: sqlx::query::QueryAs<'q, Postgres, O, sqlx::postgres::PgArguments>,
    id: Uuid,
    changes: &'q StudentChanges,
) -> sqlx::query::QueryAs<'q, Postgres, O, sqlx::postgres::PgArguments> {
    q.bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.roll_no.as_deref())
        .bind(changes.vendor_id)
        .bind(changes.is_active)
}

pub async fn find_vendor(pool: &PgPool, id: Uuid) -> Result<Option<Vendor>, DatabaseError> {
    let sql = format!("SELECT {VENDOR_COLUMNS} FROM vendors WHERE id = $1");
    let vendor = sqlx::query_as::<_, Vendor>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(vendor)
}

pub async fn find_student(pool: &PgPool, id: Uuid) -> Result<Option<Student>, DatabaseError> {
    let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1");
    let student = sqlx::query_as::<_, Student>(&sql).bind(id).fetch_optional(pool).await?;
    Ok(student)
}

pub async fn find_student_by_email<'e, E: PgExecutor<'e>>(executor: E, email: &str) -> Result<Option<Student>, DatabaseError> {
    let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE lower(email) = lower($1)");
    let student = sqlx::query_as::<_, Student>(&sql).bind(email).fetch_optional(executor).await?;
    Ok(student)
}

pub async fn update_student(pool: &PgPool, id: Uuid, changes: &StudentChanges) -> Result<Student, DatabaseError> {
    let sql = format!("{UPDATE_STUDENT_SQL} RETURNING {STUDENT_COLUMNS}");
    let updated = bind_student_changes(sqlx::query_as::<_, Student>(&sql), id, changes)
        .fetch_one(pool)
        .await?;
    Ok(updated)
}

pub async fn insert_student<'e, E: PgExecutor<'e>>(executor: E, student: &NewStudent) -> Result<Student, DatabaseError> {
    let sql = format!(
        "INSERT INTO students (id, name, email, roll_no, vendor_id, is_active, qr_code, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, TRUE, $6, NOW(), NOW()) \
         RETURNING {STUDENT_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Student>(&sql)
        .bind(Uuid::new_v4())
        .bind(&student.name)
        .bind(&student.email)
        .bind(&student.roll_no)
        .bind(student.vendor_id)
        .bind(&student.qr_code)
        .fetch_one(executor)
        .await?;
    Ok(created)
}
