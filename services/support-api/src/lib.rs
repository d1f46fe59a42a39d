//! Customer support ticket service
//!
//! REST API over PostgreSQL for tickets, their messages and photos, and the
//! users who file them. Ticket changes are pushed to an external messaging
//! service in the background.

pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod storage;

pub use state::AppState;

/// Embedded schema migrations
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
