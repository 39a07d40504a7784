//! Roster import: CSV parsing plus the reconciliation engine that brings the student
//! registry into agreement with an uploaded roster.

pub mod csv;
pub mod reconcile;

use thiserror::Error;

pub use self::csv::{read_roster, write_roster, RosterField, RosterRow};
pub use reconcile::{reconcile, ReconcileOptions, ReconciliationReport};

#[derive(Debug, Error)]
pub enum RosterError {
    /// Required columns could not be located; nothing is imported.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<&'static str>),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
