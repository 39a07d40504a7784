pub mod migrate;
pub mod roster;
pub mod stats;
pub mod users;
