//! Durable blacklist store: two independent tables keyed by address and
//! identity. Address bans have no TTL; identity bans expire and the store
//! is responsible for never returning expired entries.

use crate::models::{AddressBlockEntry, IdentityBlockEntry};
use crate::stores::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use sqlx::SqlitePool;

/// Port for the durable blacklist tables consulted on every login and
/// written by the batch correlator.
#[async_trait]
pub trait BlacklistStore: Send + Sync {
    async fn is_address_blocked(&self, address: &str) -> Result<bool, StoreError>;
    async fn is_identity_blocked(&self, identity: &str) -> Result<bool, StoreError>;
    /// Overwrite semantics: last write wins.
    async fn put_address(&self, entry: &AddressBlockEntry) -> Result<(), StoreError>;
    async fn put_identity(&self, entry: &IdentityBlockEntry) -> Result<(), StoreError>;
}

/// Sqlite-backed blacklist adapter. Expired identity rows are purged lazily
/// on read so the lookup path enforces the TTL.
pub struct SqliteBlacklistStore {
    pool: SqlitePool,
}

impl SqliteBlacklistStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlacklistStore for SqliteBlacklistStore {
    async fn is_address_blocked(&self, address: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT address FROM address_blacklist WHERE address = ?")
            .bind(address)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn is_identity_blocked(&self, identity: &str) -> Result<bool, StoreError> {
        let now = Utc::now().timestamp();
        sqlx::query("DELETE FROM identity_blacklist WHERE expire_at <= ?")
            .bind(now)
            .execute(&self.pool)
            .await?;
        let row = sqlx::query(
            "SELECT identity FROM identity_blacklist WHERE identity = ? AND expire_at > ?",
        )
        .bind(identity)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn put_address(&self, entry: &AddressBlockEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO address_blacklist (address, attempts, blocked_at)
             VALUES (?, ?, ?)
             ON CONFLICT(address) DO UPDATE SET
                 attempts = excluded.attempts,
                 blocked_at = excluded.blocked_at",
        )
        .bind(&entry.address)
        .bind(entry.attempts as i64)
        .bind(entry.blocked_at.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn put_identity(&self, entry: &IdentityBlockEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO identity_blacklist (identity, address_count, blocked_at, expire_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT(identity) DO UPDATE SET
                 address_count = excluded.address_count,
                 blocked_at = excluded.blocked_at,
                 expire_at = excluded.expire_at",
        )
        .bind(&entry.identity)
        .bind(entry.address_count as i64)
        .bind(entry.blocked_at.to_rfc3339())
        .bind(entry.expire_at.timestamp())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// In-memory blacklist adapter used by the test suites.
#[derive(Default)]
pub struct MemoryBlacklistStore {
    addresses: DashMap<String, AddressBlockEntry>,
    identities: DashMap<String, IdentityBlockEntry>,
}

impl MemoryBlacklistStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn address_entry(&self, address: &str) -> Option<AddressBlockEntry> {
        self.addresses.get(address).map(|e| e.value().clone())
    }

    pub fn identity_entry(&self, identity: &str) -> Option<IdentityBlockEntry> {
        self.identities.get(identity).map(|e| e.value().clone())
    }

    pub fn address_count(&self) -> usize {
        self.addresses.len()
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    fn expired(entry: &IdentityBlockEntry, now: DateTime<Utc>) -> bool {
        entry.expire_at <= now
    }
}

#[async_trait]
impl BlacklistStore for MemoryBlacklistStore {
    async fn is_address_blocked(&self, address: &str) -> Result<bool, StoreError> {
        Ok(self.addresses.contains_key(address))
    }

    async fn is_identity_blocked(&self, identity: &str) -> Result<bool, StoreError> {
        let now = Utc::now();
        self.identities
            .remove_if(identity, |_, entry| Self::expired(entry, now));
        Ok(self.identities.contains_key(identity))
    }

    async fn put_address(&self, entry: &AddressBlockEntry) -> Result<(), StoreError> {
        self.addresses
            .insert(entry.address.clone(), entry.clone());
        Ok(())
    }

    async fn put_identity(&self, entry: &IdentityBlockEntry) -> Result<(), StoreError> {
        self.identities
            .insert(entry.identity.clone(), entry.clone());
        Ok(())
    }
}
