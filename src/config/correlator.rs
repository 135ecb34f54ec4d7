//! Batch correlator configuration.

use crate::config::env_or;

/// Tuning for the batch correlation cycle: query window, polling, and
/// blacklist thresholds.
#[derive(Debug, Clone)]
pub struct CorrelatorConfig {
    /// Trailing window analyzed per cycle, in seconds.
    pub window_secs: u64,
    /// Maximum records fetched per windowed query.
    pub result_limit: u32,
    /// Delay between query status polls, in seconds.
    pub poll_interval_secs: u64,
    /// Maximum polls before a cycle is abandoned. The original design
    /// polled without bound; see DESIGN.md.
    pub max_poll_attempts: u32,
    /// Max observed failure count above which an address is blacklisted.
    pub address_block_threshold: u64,
    /// Distinct-address count at which an identity is blacklisted.
    pub identity_spread_threshold: usize,
    /// TTL for identity blacklist entries, in seconds.
    pub identity_ttl_secs: u64,
    /// Correlation cycle period in seconds.
    pub period_secs: u64,
}

impl Default for CorrelatorConfig {
    fn default() -> Self {
        Self {
            window_secs: 600,
            result_limit: 500,
            poll_interval_secs: 1,
            max_poll_attempts: 300,
            address_block_threshold: 10,
            identity_spread_threshold: 3,
            identity_ttl_secs: 600,
            period_secs: 300,
        }
    }
}

impl CorrelatorConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            window_secs: env_or("CORRELATION_WINDOW_SECS", defaults.window_secs),
            result_limit: env_or("QUERY_RESULT_LIMIT", defaults.result_limit),
            poll_interval_secs: env_or("QUERY_POLL_INTERVAL_SECS", defaults.poll_interval_secs),
            max_poll_attempts: env_or("QUERY_MAX_POLLS", defaults.max_poll_attempts),
            address_block_threshold: env_or(
                "ADDRESS_BLOCK_THRESHOLD",
                defaults.address_block_threshold,
            ),
            identity_spread_threshold: env_or(
                "IDENTITY_SPREAD_THRESHOLD",
                defaults.identity_spread_threshold,
            ),
            identity_ttl_secs: env_or("IDENTITY_BAN_TTL_SECS", defaults.identity_ttl_secs),
            period_secs: env_or("CORRELATION_PERIOD_SECS", defaults.period_secs),
        }
    }
}
