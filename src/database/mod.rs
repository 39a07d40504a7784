pub mod manager;
pub mod models;
pub mod reports;
pub mod repository;
pub mod service;
pub mod store;

pub use manager::{DatabaseError, DatabaseManager};
pub use repository::PgRepository;
pub use store::{ActiveStudent, ClaimStore, RosterStore, RosterTx};
