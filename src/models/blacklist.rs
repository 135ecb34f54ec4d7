//! Durable blacklist entry models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel attempt count recorded for out-of-band immediate blocks,
/// distinguishing them from counts derived by correlation.
pub const IMMEDIATE_BLOCK_ATTEMPTS: u64 = 999;

/// Durable ban of a source address. No TTL; persists until manually cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBlockEntry {
    pub address: String,
    /// Cumulative failed attempts observed at ban time.
    pub attempts: u64,
    pub blocked_at: DateTime<Utc>,
}

/// Durable ban of an identity, expiring after a TTL enforced by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityBlockEntry {
    pub identity: String,
    /// Distinct addresses seen attempting this identity at ban time.
    pub address_count: u64,
    pub blocked_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}
