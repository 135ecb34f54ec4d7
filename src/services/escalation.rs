//! Threshold escalation: per-address idempotent metric emission and ban
//! invocation.

use crate::services::ledger::{AttemptLedger, AttemptRecord};
use crate::services::metrics::MetricSink;
use crate::stores::BanTrigger;
use std::sync::Arc;
use tracing::{info, warn};

/// Gate evaluating each failure against the address failure threshold.
///
/// Both side effects are claimed through the ledger's atomic test-and-set
/// flags, so each fires at most once per record lifetime no matter how many
/// requests cross the threshold concurrently. A failed side effect is
/// logged but never rolls the claim back: enforcement is at-most-once, and
/// silent duplicate bans are worse than a surfaced miss.
pub struct EscalationGate {
    ledger: Arc<AttemptLedger>,
    metrics: Arc<dyn MetricSink>,
    ban: Arc<dyn BanTrigger>,
    failure_threshold: u64,
}

impl EscalationGate {
    pub fn new(
        ledger: Arc<AttemptLedger>,
        metrics: Arc<dyn MetricSink>,
        ban: Arc<dyn BanTrigger>,
        failure_threshold: u64,
    ) -> Self {
        Self {
            ledger,
            metrics,
            ban,
            failure_threshold,
        }
    }

    /// Evaluate the record produced by a `record_failure` call. Invoked
    /// synchronously on the request path after every failed login.
    pub async fn on_failure(&self, record: &AttemptRecord) {
        if record.failure_count <= self.failure_threshold {
            return;
        }

        if let Some(count) = self.ledger.claim_metric(&record.address) {
            if let Err(err) = self.metrics.emit_failed_attempts(&record.address, count).await {
                warn!(address = %record.address, error = %err, "failed to emit failed-login metric");
            }
        }

        if self.ledger.claim_ban(&record.address) {
            info!(
                address = %record.address,
                failures = record.failure_count,
                "failure threshold exceeded, invoking ban trigger"
            );
            if let Err(err) = self.ban.invoke(&record.address).await {
                warn!(address = %record.address, error = %err, "ban trigger invocation failed");
            }
        }
    }
}
