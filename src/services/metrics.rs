//! Metrics collection and Prometheus integration service.

use crate::stores::StoreError;
use async_trait::async_trait;
use prometheus::{CounterVec, GaugeVec, Opts, Registry, TextEncoder};

/// Port for emitting the per-address failed-login data point. The
/// escalation gate emits through this seam at most once per record.
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn emit_failed_attempts(&self, address: &str, count: u64) -> Result<(), StoreError>;
}

/// Security metrics collector for Prometheus integration
#[derive(Clone)]
pub struct SecurityMetrics {
    pub registry: Registry,
    pub failed_login_attempts: GaugeVec,
    pub logins_rejected_total: CounterVec,
}

impl SecurityMetrics {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        // Failed login attempts at escalation time, keyed by source address
        let failed_login_attempts = GaugeVec::new(
            Opts::new(
                "failed_login_attempts",
                "Failed login attempts observed when an address crossed the failure threshold",
            ),
            &["address"],
        )?;

        // Rejected logins by reason
        let logins_rejected_total = CounterVec::new(
            Opts::new("logins_rejected_total", "Total rejected login requests"),
            &["reason"],
        )?;

        registry.register(Box::new(failed_login_attempts.clone()))?;
        registry.register(Box::new(logins_rejected_total.clone()))?;

        Ok(Self {
            registry,
            failed_login_attempts,
            logins_rejected_total,
        })
    }

    /// Count a rejected login by reason
    pub fn record_rejection(&self, reason: &str) {
        self.logins_rejected_total.with_label_values(&[reason]).inc();
    }

    /// Render metrics in Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode_to_string(&metric_families)
    }
}

#[async_trait]
impl MetricSink for SecurityMetrics {
    async fn emit_failed_attempts(&self, address: &str, count: u64) -> Result<(), StoreError> {
        self.failed_login_attempts
            .with_label_values(&[address])
            .set(count as f64);
        Ok(())
    }
}
