//! Configuration structures and loading utilities.
//!
//! This module contains all configuration structures used by the
//! application, including environment variable loading and default values.

pub mod correlator;
pub mod metrics;
pub mod stores;
pub mod thresholds;

pub use correlator::*;
pub use metrics::*;
pub use stores::*;
pub use thresholds::*;

use std::env;

/// Read an env var parsed into `T`, falling back to `default` when unset
/// or unparseable.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
