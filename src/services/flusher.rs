//! Periodic drain of over-threshold ledger entries into the durable log
//! and the webhook sink.

use crate::models::{LogEvent, SuspiciousReport};
use crate::services::ledger::{AttemptLedger, AttemptRecord};
use crate::stores::{ActivityLogStore, WebhookSink};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

/// Drains ledger records that crossed the reporting threshold (or already
/// emitted their metric) into the durable activity log, forwards the same
/// batch to the webhook sink best-effort, and removes fully handled
/// entries.
///
/// The log append is the authoritative side effect: nothing is removed
/// from the ledger unless it succeeded, so a failed cycle is naturally
/// retried from the then-current state on the next tick.
pub struct FlushEmitter {
    ledger: Arc<AttemptLedger>,
    log: Arc<dyn ActivityLogStore>,
    webhook: Arc<dyn WebhookSink>,
    reporting_threshold: u64,
    period: Duration,
}

impl FlushEmitter {
    pub fn new(
        ledger: Arc<AttemptLedger>,
        log: Arc<dyn ActivityLogStore>,
        webhook: Arc<dyn WebhookSink>,
        reporting_threshold: u64,
        period_secs: u64,
    ) -> Self {
        Self {
            ledger,
            log,
            webhook,
            reporting_threshold,
            period: Duration::from_secs(period_secs),
        }
    }

    fn reportable(&self, record: &AttemptRecord) -> bool {
        record.metric_emitted || record.failure_count > self.reporting_threshold
    }

    /// One flush pass. Returns the number of ledger entries removed.
    pub async fn flush_once(&self) -> usize {
        let batch: Vec<AttemptRecord> = self
            .ledger
            .snapshot()
            .into_iter()
            .filter(|record| self.reportable(record))
            .collect();
        if batch.is_empty() {
            return 0;
        }

        let now = Utc::now();
        let mut reports = Vec::with_capacity(batch.len());
        let mut events = Vec::with_capacity(batch.len());
        let mut logged = Vec::with_capacity(batch.len());
        for record in batch {
            let report = SuspiciousReport {
                address: record.address.clone(),
                failed_attempts: record.failure_count,
                identity: record.identities.first().cloned().unwrap_or_default(),
                timestamp: now,
            };
            match serde_json::to_string(&report) {
                Ok(message) => {
                    events.push(LogEvent {
                        message,
                        timestamp: now,
                    });
                    reports.push(report);
                    // Only records that made it into the append batch are
                    // candidates for removal below.
                    logged.push(record);
                }
                Err(err) => {
                    warn!(address = %report.address, error = %err, "failed to serialize suspicious report");
                }
            }
        }
        if events.is_empty() {
            return 0;
        }

        if let Err(err) = self.log.append(events).await {
            warn!(error = %err, "activity log append failed, keeping ledger entries for retry");
            return 0;
        }
        info!(count = reports.len(), "flushed suspicious activity batch");

        // Log durability and webhook delivery are independent.
        if let Err(err) = self.webhook.deliver(&reports).await {
            warn!(error = %err, "webhook delivery failed");
        }

        let mut removed = 0;
        for record in &logged {
            if self.ledger.remove_if(&record.address, |current| {
                current.failure_count == record.failure_count
                    && current.last_attempt == record.last_attempt
            }) {
                removed += 1;
            }
        }
        removed
    }

    /// Spawn the periodic flush loop. Runs never overlap their own
    /// previous cycle.
    pub fn spawn(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.flush_once().await;
            }
        })
    }
}
