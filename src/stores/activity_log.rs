//! Append-only suspicious-activity log with windowed, field-extracting
//! queries.
//!
//! Queries are asynchronous jobs: submission returns a handle, and the
//! caller polls until the job reaches a terminal state. The store performs
//! the field extraction (address, failed attempts, identity) from each
//! record's JSON message; fields it cannot extract come back as `None`.

use crate::models::{LogEvent, QueryRow, QueryWindow};
use crate::stores::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::{Row, SqlitePool};
use std::sync::{Arc, Mutex};
use tracing::warn;
use uuid::Uuid;

/// State of a windowed activity query job.
#[derive(Debug, Clone)]
pub enum QueryStatus {
    Running,
    Complete(Vec<QueryRow>),
    Failed(String),
}

/// Port for the durable activity log store.
#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    /// Append a batch of events in one call. Ordering within the batch
    /// carries no meaning downstream.
    async fn append(&self, events: Vec<LogEvent>) -> Result<(), StoreError>;

    /// Submit a windowed query sorted by recency and capped at `limit`
    /// records. Returns a job handle to poll.
    async fn start_query(&self, window: QueryWindow, limit: u32) -> Result<Uuid, StoreError>;

    /// Poll a query job. Terminal results are consumed: polling the same
    /// completed job twice yields `UnknownQuery`.
    async fn poll_query(&self, query_id: Uuid) -> Result<QueryStatus, StoreError>;

    /// Discard a query job without consuming its result. Callers that give
    /// up on a job must forget it so the job table stays bounded; unknown
    /// handles are a no-op.
    async fn forget_query(&self, query_id: Uuid);
}

/// Extract the structured fields from a serialized log message.
fn extract_row(message: &str) -> QueryRow {
    let value: serde_json::Value = match serde_json::from_str(message) {
        Ok(value) => value,
        Err(_) => return QueryRow::default(),
    };
    QueryRow {
        address: value
            .get("address")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        failed_attempts: value.get("failed_attempts").and_then(|v| v.as_u64()),
        identity: value
            .get("identity")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string),
    }
}

/// Sqlite-backed activity log. Query jobs run on a background task and
/// publish their terminal state into a shared job table.
pub struct SqliteActivityLog {
    pool: SqlitePool,
    jobs: Arc<DashMap<Uuid, QueryStatus>>,
}

impl SqliteActivityLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            jobs: Arc::new(DashMap::new()),
        }
    }

    async fn run_query(
        pool: &SqlitePool,
        window: QueryWindow,
        limit: u32,
    ) -> Result<Vec<QueryRow>, StoreError> {
        let rows = sqlx::query(
            "SELECT message FROM activity_log
             WHERE timestamp >= ? AND timestamp <= ?
             ORDER BY timestamp DESC
             LIMIT ?",
        )
        .bind(window.start.timestamp_millis())
        .bind(window.end.timestamp_millis())
        .bind(limit as i64)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| extract_row(row.get::<String, _>("message").as_str()))
            .collect())
    }
}

#[async_trait]
impl ActivityLogStore for SqliteActivityLog {
    async fn append(&self, events: Vec<LogEvent>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for event in &events {
            sqlx::query("INSERT INTO activity_log (message, timestamp) VALUES (?, ?)")
                .bind(&event.message)
                .bind(event.timestamp.timestamp_millis())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn start_query(&self, window: QueryWindow, limit: u32) -> Result<Uuid, StoreError> {
        let query_id = Uuid::new_v4();
        self.jobs.insert(query_id, QueryStatus::Running);

        let pool = self.pool.clone();
        let jobs = Arc::clone(&self.jobs);
        tokio::spawn(async move {
            let status = match Self::run_query(&pool, window, limit).await {
                Ok(rows) => QueryStatus::Complete(rows),
                Err(err) => {
                    warn!(query_id = %query_id, error = %err, "activity query failed");
                    QueryStatus::Failed(err.to_string())
                }
            };
            // A job forgotten mid-flight stays forgotten; its result is
            // dropped rather than re-inserted.
            if let Some(mut entry) = jobs.get_mut(&query_id) {
                *entry = status;
            }
        });

        Ok(query_id)
    }

    async fn poll_query(&self, query_id: Uuid) -> Result<QueryStatus, StoreError> {
        let status = self
            .jobs
            .get(&query_id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::UnknownQuery(query_id))?;
        if !matches!(status, QueryStatus::Running) {
            self.jobs.remove(&query_id);
        }
        Ok(status)
    }

    async fn forget_query(&self, query_id: Uuid) {
        self.jobs.remove(&query_id);
    }
}

/// In-memory activity log used by the test suites. Queries complete
/// immediately but still go through the job-handle protocol.
#[derive(Default)]
pub struct MemoryActivityLog {
    events: Mutex<Vec<LogEvent>>,
    jobs: DashMap<Uuid, QueryStatus>,
}

impl MemoryActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }
}

#[async_trait]
impl ActivityLogStore for MemoryActivityLog {
    async fn append(&self, mut events: Vec<LogEvent>) -> Result<(), StoreError> {
        self.events.lock().unwrap().append(&mut events);
        Ok(())
    }

    async fn start_query(&self, window: QueryWindow, limit: u32) -> Result<Uuid, StoreError> {
        let mut selected: Vec<(chrono::DateTime<chrono::Utc>, QueryRow)> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.timestamp >= window.start && e.timestamp <= window.end)
            .map(|e| (e.timestamp, extract_row(&e.message)))
            .collect();
        selected.sort_by(|a, b| b.0.cmp(&a.0));
        selected.truncate(limit as usize);

        let query_id = Uuid::new_v4();
        self.jobs.insert(
            query_id,
            QueryStatus::Complete(selected.into_iter().map(|(_, row)| row).collect()),
        );
        Ok(query_id)
    }

    async fn poll_query(&self, query_id: Uuid) -> Result<QueryStatus, StoreError> {
        let status = self
            .jobs
            .get(&query_id)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::UnknownQuery(query_id))?;
        if !matches!(status, QueryStatus::Running) {
            self.jobs.remove(&query_id);
        }
        Ok(status)
    }

    async fn forget_query(&self, query_id: Uuid) {
        self.jobs.remove(&query_id);
    }
}
