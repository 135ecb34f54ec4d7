//! External collaborator seams and their adapters.
//!
//! Every durable or remote dependency of the engine sits behind an async
//! trait in this module: the blacklist store, the append-only activity log,
//! the credential store, the ban trigger, and the webhook sink. Production
//! adapters are sqlite-backed (stores) or HTTP-backed (trigger/sink);
//! in-memory adapters back the test suites.

pub mod activity_log;
pub mod ban;
pub mod blacklist;
pub mod credential;
pub mod webhook;

pub use activity_log::*;
pub use ban::*;
pub use blacklist::*;
pub use credential::*;
pub use webhook::*;

use sqlx::SqlitePool;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by collaborator calls. These are logged by the engine
/// and never propagated past the request boundary in detail.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
    #[error("unknown query job: {0}")]
    UnknownQuery(Uuid),
}

/// Create the sqlite tables backing the blacklist and activity-log adapters.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS address_blacklist (
            address TEXT PRIMARY KEY,
            attempts INTEGER NOT NULL,
            blocked_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS identity_blacklist (
            identity TEXT PRIMARY KEY,
            address_count INTEGER NOT NULL,
            blocked_at TEXT NOT NULL,
            expire_at INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS activity_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            message TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    Ok(())
}
