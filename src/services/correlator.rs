//! Batch correlation over the durable activity log.
//!
//! Each cycle queries the trailing window, aggregates the extracted rows
//! per address (maximum observed failure count, because the log carries
//! cumulative counts per flush) and per identity (distinct source
//! addresses), and writes blacklist entries for everything past the
//! thresholds. The identity aggregation is the defense against
//! distributed password-spraying: many addresses working one account.

use crate::config::CorrelatorConfig;
use crate::models::{AddressBlockEntry, IdentityBlockEntry, QueryRow, QueryWindow};
use crate::models::IMMEDIATE_BLOCK_ATTEMPTS;
use crate::stores::{ActivityLogStore, BlacklistStore, QueryStatus, StoreError};
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Result of one correlation cycle, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CorrelationSummary {
    pub records: usize,
    pub addresses_blocked: usize,
    pub identities_blocked: usize,
}

/// Scheduled analyzer committing longer-lived blacklist decisions from the
/// durable log, plus the immediate out-of-band block path.
pub struct BatchCorrelator {
    log: Arc<dyn ActivityLogStore>,
    blacklist: Arc<dyn BlacklistStore>,
    config: CorrelatorConfig,
}

impl BatchCorrelator {
    pub fn new(
        log: Arc<dyn ActivityLogStore>,
        blacklist: Arc<dyn BlacklistStore>,
        config: CorrelatorConfig,
    ) -> Self {
        Self {
            log,
            blacklist,
            config,
        }
    }

    /// Run one cycle over the trailing window.
    pub async fn correlate_once(&self) -> CorrelationSummary {
        self.correlate_window(QueryWindow::trailing(self.config.window_secs))
            .await
    }

    /// Run one cycle over an explicit window. Aggregation is deterministic:
    /// replaying the same records yields the same decisions.
    pub async fn correlate_window(&self, window: QueryWindow) -> CorrelationSummary {
        let Some(rows) = self.run_query(window).await else {
            return CorrelationSummary::default();
        };
        if rows.is_empty() {
            info!("no suspicious activity in the correlation window");
            return CorrelationSummary::default();
        }
        info!(records = rows.len(), "correlating suspicious activity records");

        let (max_failures, identity_addresses) = Self::aggregate(&rows);

        let mut summary = CorrelationSummary {
            records: rows.len(),
            ..CorrelationSummary::default()
        };

        for (address, attempts) in &max_failures {
            if *attempts <= self.config.address_block_threshold {
                continue;
            }
            let entry = AddressBlockEntry {
                address: address.clone(),
                attempts: *attempts,
                blocked_at: Utc::now(),
            };
            // Each write is independent; one failure never aborts the rest.
            match self.blacklist.put_address(&entry).await {
                Ok(()) => {
                    info!(address = %address, attempts, "address blacklisted by correlation");
                    summary.addresses_blocked += 1;
                }
                Err(err) => {
                    warn!(address = %address, error = %err, "failed to blacklist address");
                }
            }
        }

        for (identity, addresses) in &identity_addresses {
            if addresses.len() < self.config.identity_spread_threshold {
                continue;
            }
            let entry = IdentityBlockEntry {
                identity: identity.clone(),
                address_count: addresses.len() as u64,
                blocked_at: Utc::now(),
                expire_at: window.end
                    + ChronoDuration::seconds(self.config.identity_ttl_secs as i64),
            };
            match self.blacklist.put_identity(&entry).await {
                Ok(()) => {
                    info!(
                        identity = %identity,
                        unique_addresses = addresses.len(),
                        "identity blacklisted by correlation"
                    );
                    summary.identities_blocked += 1;
                }
                Err(err) => {
                    warn!(identity = %identity, error = %err, "failed to blacklist identity");
                }
            }
        }

        summary
    }

    /// Immediate unconditional block of a single address, bypassing
    /// aggregation. Used for manual or upstream-signaled blocks.
    pub async fn block_address_now(&self, address: &str) -> Result<(), StoreError> {
        let entry = AddressBlockEntry {
            address: address.to_string(),
            attempts: IMMEDIATE_BLOCK_ATTEMPTS,
            blocked_at: Utc::now(),
        };
        self.blacklist.put_address(&entry).await?;
        info!(address = %address, "address blocked via immediate path");
        Ok(())
    }

    /// Submit the windowed query and poll it to a terminal state. Any
    /// failure aborts this cycle with a warning; the process carries on.
    async fn run_query(&self, window: QueryWindow) -> Option<Vec<QueryRow>> {
        let query_id = match self.log.start_query(window, self.config.result_limit).await {
            Ok(id) => id,
            Err(err) => {
                warn!(error = %err, "failed to submit activity query, aborting cycle");
                return None;
            }
        };

        for _ in 0..self.config.max_poll_attempts {
            tokio::time::sleep(Duration::from_secs(self.config.poll_interval_secs)).await;
            match self.log.poll_query(query_id).await {
                Ok(QueryStatus::Running) => continue,
                Ok(QueryStatus::Complete(rows)) => return Some(rows),
                Ok(QueryStatus::Failed(reason)) => {
                    warn!(query_id = %query_id, reason = %reason, "activity query failed, aborting cycle");
                    return None;
                }
                Err(err) => {
                    warn!(query_id = %query_id, error = %err, "activity query poll failed, aborting cycle");
                    self.log.forget_query(query_id).await;
                    return None;
                }
            }
        }

        // Abandoned jobs are forgotten so the store's job table never
        // accumulates results nobody will consume.
        self.log.forget_query(query_id).await;
        warn!(
            query_id = %query_id,
            attempts = self.config.max_poll_attempts,
            "activity query did not complete in time, aborting cycle"
        );
        None
    }

    /// Derive the per-address and per-identity aggregates. Rows without an
    /// address are skipped; rows without an identity only contribute to the
    /// address aggregate.
    fn aggregate(rows: &[QueryRow]) -> (HashMap<String, u64>, HashMap<String, HashSet<String>>) {
        let mut max_failures: HashMap<String, u64> = HashMap::new();
        let mut identity_addresses: HashMap<String, HashSet<String>> = HashMap::new();

        for row in rows {
            let Some(address) = &row.address else {
                continue;
            };
            let attempts = row.failed_attempts.unwrap_or(0);
            let entry = max_failures.entry(address.clone()).or_insert(0);
            // The log carries cumulative counts per flush, so the maximum,
            // not the sum, reflects what one address actually did.
            *entry = (*entry).max(attempts);

            if let Some(identity) = &row.identity {
                identity_addresses
                    .entry(identity.clone())
                    .or_default()
                    .insert(address.clone());
            }
        }

        (max_failures, identity_addresses)
    }

    /// Spawn the periodic correlation loop. Runs never overlap their own
    /// previous cycle.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(self.config.period_secs));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.correlate_once().await;
            }
        })
    }
}
