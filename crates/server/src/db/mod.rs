//! Database operations for the `SQLite` ledger.
//!
//! ## Tables
//!
//! - `tenants` - Tenant accounts and credential hashes
//! - `products` - Catalog items with the running stock total
//! - `purchases` - Append-only stock intake history
//! - `sales` - Append-only stock outflow history
//!
//! Every ledger query is scoped by `owner_id`; a lookup with another tenant's
//! id is indistinguishable from a missing row.
//!
//! Monetary values are stored as TEXT and parsed into [`rust_decimal::Decimal`]
//! on read; a value that fails to parse surfaces as
//! [`RepositoryError::DataCorruption`].
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are embedded via
//! [`MIGRATOR`]; they run at startup and in test setup.

pub mod products;
pub mod purchases;
pub mod sales;
pub mod tenants;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use products::ProductRepository;
pub use purchases::PurchaseRepository;
pub use sales::{SaleOutcome, SaleRepository};
pub use tenants::TenantRepository;

/// Embedded migrations for the ledger schema.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created if missing; WAL journaling keeps readers from
/// blocking the single writer.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        // Writers queue on the lock instead of failing immediately
        .busy_timeout(Duration::from_secs(5))
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

/// Parse a stored decimal column, reporting corruption with the column name.
pub(crate) fn parse_decimal(value: &str, column: &str) -> Result<Decimal, RepositoryError> {
    Decimal::from_str(value).map_err(|_| {
        RepositoryError::DataCorruption(format!("invalid decimal in {column}: {value:?}"))
    })
}
