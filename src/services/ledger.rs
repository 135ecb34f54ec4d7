//! Process-wide ledger of per-address failed-login state.
//!
//! The ledger is the only in-process mutable shared state. All mutation
//! goes through its methods, each of which holds the map's shard lock for
//! the key while it runs, so increments from concurrent requests on the
//! same address serialize and the escalation claim flags behave as atomic
//! test-and-set operations.
//!
//! The ledger is a short-horizon signal: it lives for the process lifetime
//! and is never persisted. Durable decisions live in the blacklist stores.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// Rolling failure state for one source address.
///
/// `metric_emitted` and `ban_triggered` each transition false to true at
/// most once for the lifetime of the record and are never reset while it
/// exists. A record deleted by the sweeper or flush emitter may be
/// recreated fresh by the next failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub address: String,
    /// Monotonically increasing since the record was created.
    pub failure_count: u64,
    /// Distinct identities attempted from this address, in first-seen
    /// order. The first element is the representative identity reported
    /// by the flush emitter.
    pub identities: Vec<String>,
    pub last_attempt: DateTime<Utc>,
    pub metric_emitted: bool,
    pub ban_triggered: bool,
}

/// Concurrent map from source address to its [`AttemptRecord`].
#[derive(Default)]
pub struct AttemptLedger {
    records: DashMap<String, AttemptRecord>,
}

impl AttemptLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failed login from `address` attempting `identity`.
    ///
    /// Creates the record if absent, otherwise increments the failure
    /// count, adds the identity if new, and refreshes the last-attempt
    /// timestamp. Returns a snapshot of the updated record.
    pub fn record_failure(&self, address: &str, identity: &str) -> AttemptRecord {
        let mut entry = self
            .records
            .entry(address.to_string())
            .or_insert_with(|| AttemptRecord {
                address: address.to_string(),
                failure_count: 0,
                identities: Vec::new(),
                last_attempt: Utc::now(),
                metric_emitted: false,
                ban_triggered: false,
            });
        let record = entry.value_mut();
        record.failure_count += 1;
        if !record.identities.iter().any(|i| i == identity) {
            record.identities.push(identity.to_string());
        }
        record.last_attempt = Utc::now();
        record.clone()
    }

    /// Snapshot of one record, if present.
    pub fn get(&self, address: &str) -> Option<AttemptRecord> {
        self.records.get(address).map(|r| r.value().clone())
    }

    /// Claim the metric emission for `address`. Returns the failure count
    /// at claim time for the single winner, `None` for everyone else.
    pub fn claim_metric(&self, address: &str) -> Option<u64> {
        self.records.get_mut(address).and_then(|mut entry| {
            let record = entry.value_mut();
            if record.metric_emitted {
                None
            } else {
                record.metric_emitted = true;
                Some(record.failure_count)
            }
        })
    }

    /// Claim the ban invocation for `address`. True for the single winner.
    pub fn claim_ban(&self, address: &str) -> bool {
        self.records
            .get_mut(address)
            .map(|mut entry| {
                let record = entry.value_mut();
                if record.ban_triggered {
                    false
                } else {
                    record.ban_triggered = true;
                    true
                }
            })
            .unwrap_or(false)
    }

    /// Remove the record for `address` only if `predicate` holds for the
    /// current value, evaluated under the shard lock. This is the
    /// delete-if-unchanged primitive the sweeper and flush emitter use so
    /// a racing `record_failure` is never silently lost.
    pub fn remove_if(
        &self,
        address: &str,
        predicate: impl FnOnce(&AttemptRecord) -> bool,
    ) -> bool {
        self.records
            .remove_if(address, |_, record| predicate(record))
            .is_some()
    }

    /// Consistent copy of all records. Callers iterate the copy, never the
    /// live map.
    pub fn snapshot(&self) -> Vec<AttemptRecord> {
        self.records.iter().map(|r| r.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn first_failure_creates_a_fresh_record() {
        let ledger = AttemptLedger::new();
        let record = ledger.record_failure("10.0.0.1", "alice");
        assert_eq!(record.failure_count, 1);
        assert_eq!(record.identities, vec!["alice".to_string()]);
        assert!(!record.metric_emitted);
        assert!(!record.ban_triggered);
    }

    #[test]
    fn identities_are_deduplicated_in_first_seen_order() {
        let ledger = AttemptLedger::new();
        ledger.record_failure("10.0.0.1", "alice");
        ledger.record_failure("10.0.0.1", "bob");
        let record = ledger.record_failure("10.0.0.1", "alice");
        assert_eq!(record.failure_count, 3);
        assert_eq!(
            record.identities,
            vec!["alice".to_string(), "bob".to_string()]
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_failures_are_never_lost() {
        let ledger = Arc::new(AttemptLedger::new());
        let mut handles = Vec::new();
        for i in 0..200u32 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move {
                ledger.record_failure("10.0.0.1", &format!("user{}", i % 10));
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = ledger.get("10.0.0.1").unwrap();
        assert_eq!(record.failure_count, 200);
        assert_eq!(record.identities.len(), 10);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn metric_claim_has_exactly_one_winner() {
        let ledger = Arc::new(AttemptLedger::new());
        for _ in 0..20 {
            ledger.record_failure("10.0.0.1", "alice");
        }

        let mut handles = Vec::new();
        for _ in 0..50 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(
                async move { ledger.claim_metric("10.0.0.1") },
            ));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap().is_some() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);

        // The flag stays set for the record's lifetime.
        ledger.record_failure("10.0.0.1", "alice");
        assert!(ledger.claim_metric("10.0.0.1").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn ban_claim_has_exactly_one_winner() {
        let ledger = Arc::new(AttemptLedger::new());
        ledger.record_failure("10.0.0.1", "alice");

        let mut handles = Vec::new();
        for _ in 0..50 {
            let ledger = Arc::clone(&ledger);
            handles.push(tokio::spawn(async move { ledger.claim_ban("10.0.0.1") }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }

    #[test]
    fn claims_on_absent_records_lose() {
        let ledger = AttemptLedger::new();
        assert!(ledger.claim_metric("10.0.0.1").is_none());
        assert!(!ledger.claim_ban("10.0.0.1"));
    }

    #[test]
    fn remove_if_honors_the_predicate() {
        let ledger = AttemptLedger::new();
        let snapshot = ledger.record_failure("10.0.0.1", "alice");

        // A record updated after the snapshot is not removed.
        ledger.record_failure("10.0.0.1", "bob");
        assert!(!ledger.remove_if("10.0.0.1", |r| r.failure_count == snapshot.failure_count));
        assert_eq!(ledger.len(), 1);

        let current = ledger.get("10.0.0.1").unwrap();
        assert!(ledger.remove_if("10.0.0.1", |r| r.failure_count == current.failure_count));
        assert!(ledger.is_empty());

        // The address is free to be recreated fresh.
        let fresh = ledger.record_failure("10.0.0.1", "carol");
        assert_eq!(fresh.failure_count, 1);
    }
}
