//! Request-path aggregation thresholds and background task periods.

use crate::config::env_or;

/// Configuration for the attempt ledger, escalation gate, sweeper, and
/// flush emitter.
#[derive(Debug, Clone)]
pub struct ThresholdConfig {
    /// Failure count above which a record escalates (metric + ban).
    pub failure_threshold: u64,
    /// Failure count above which the flush emitter reports a record.
    pub reporting_threshold: u64,
    /// Seconds of inactivity after which the sweeper evicts a record.
    pub inactivity_window_secs: u64,
    /// Sweeper period in seconds.
    pub sweep_period_secs: u64,
    /// Flush emitter period in seconds.
    pub flush_period_secs: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 10,
            reporting_threshold: 10,
            inactivity_window_secs: 600,
            sweep_period_secs: 60,
            flush_period_secs: 30,
        }
    }
}

impl ThresholdConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            failure_threshold: env_or("FAILURE_THRESHOLD", defaults.failure_threshold),
            reporting_threshold: env_or("REPORTING_THRESHOLD", defaults.reporting_threshold),
            inactivity_window_secs: env_or(
                "INACTIVITY_WINDOW_SECS",
                defaults.inactivity_window_secs,
            ),
            sweep_period_secs: env_or("SWEEP_PERIOD_SECS", defaults.sweep_period_secs),
            flush_period_secs: env_or("FLUSH_PERIOD_SECS", defaults.flush_period_secs),
        }
    }
}
