pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod qr;
pub mod roster;
pub mod routes;
pub mod verification;

#[cfg(test)]
pub mod testing;
