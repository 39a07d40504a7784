use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub contact: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored form of a vendor name: trimmed, inner whitespace runs collapsed to one space.
pub fn tidy_vendor_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lookup key for vendor names: `"Uniworld "` and `"uniworld"` collide.
pub fn normalize_vendor_name(name: &str) -> String {
    tidy_vendor_name(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_vendor_name("Uniworld "), "uniworld");
        assert_eq!(normalize_vendor_name("  CAFETERIA b"), "cafeteria b");
        assert_eq!(normalize_vendor_name("uniworld"), normalize_vendor_name(" UniWorld\t"));
        assert_eq!(normalize_vendor_name("Cafeteria   B"), "cafeteria b");
    }

    #[test]
    fn tidying_keeps_case() {
        assert_eq!(tidy_vendor_name("  Cafeteria \t  B "), "Cafeteria B");
        assert_eq!(tidy_vendor_name("Uniworld"), "Uniworld");
    }
}
