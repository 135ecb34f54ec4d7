//! Business logic and service layer modules.
//!
//! This module contains the core of the engine: the attempt ledger, the
//! escalation gate, the background sweeper/flusher/correlator tasks, the
//! login gate, and metrics collection.

pub mod correlator;
pub mod escalation;
pub mod flusher;
pub mod ledger;
pub mod login_gate;
pub mod metrics;
pub mod sweeper;

pub use correlator::*;
pub use escalation::*;
pub use flusher::*;
pub use ledger::*;
pub use login_gate::*;
pub use metrics::*;
pub use sweeper::*;
