use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Meal type used for every claim; one claim per student per day.
pub const DEFAULT_MEAL_TYPE: &str = "lunch";

/// One redemption event. Rows are only ever inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealRecord {
    pub id: Uuid,
    pub student_id: Uuid,
    pub vendor_id: Uuid,
    pub meal_date: NaiveDate,
    pub meal_type: String,
    pub claimed: bool,
    pub claimed_at: DateTime<Utc>,
    pub claimed_by: Option<Uuid>,
}

/// Everything needed to write a claim atomically
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub student_id: Uuid,
    pub vendor_id: Uuid,
    pub meal_date: NaiveDate,
    pub meal_type: String,
    pub claimed_at: DateTime<Utc>,
    pub claimed_by: Option<Uuid>,
}

impl NewClaim {
    pub fn into_record(self, id: Uuid) -> MealRecord {
        MealRecord {
            id,
            student_id: self.student_id,
            vendor_id: self.vendor_id,
            meal_date: self.meal_date,
            meal_type: self.meal_type,
            claimed: true,
            claimed_at: self.claimed_at,
            claimed_by: self.claimed_by,
        }
    }
}
