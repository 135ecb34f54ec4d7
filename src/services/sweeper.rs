//! Periodic eviction of stale attempt records.

use crate::services::ledger::AttemptLedger;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Evicts ledger records idle longer than the inactivity window. This is
/// the only path that reclaims addresses that stayed below every
/// threshold, keeping the ledger bounded.
pub struct Sweeper {
    ledger: Arc<AttemptLedger>,
    inactivity_window: chrono::Duration,
    period: Duration,
}

impl Sweeper {
    pub fn new(ledger: Arc<AttemptLedger>, inactivity_window_secs: u64, period_secs: u64) -> Self {
        Self {
            ledger,
            inactivity_window: chrono::Duration::seconds(inactivity_window_secs as i64),
            period: Duration::from_secs(period_secs),
        }
    }

    /// One sweep pass. Removal re-checks the timestamp under the shard
    /// lock, so a failure racing in after the staleness check keeps its
    /// record.
    pub fn sweep_once(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        for record in self.ledger.snapshot() {
            if now - record.last_attempt <= self.inactivity_window {
                continue;
            }
            let seen = record.last_attempt;
            if self
                .ledger
                .remove_if(&record.address, |current| current.last_attempt == seen)
            {
                removed += 1;
            }
        }
        removed
    }

    /// Spawn the periodic sweep loop. Runs never overlap their own
    /// previous cycle.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.sweep_once();
                if removed > 0 {
                    debug!(removed, "evicted stale attempt records");
                }
            }
        })
    }
}
