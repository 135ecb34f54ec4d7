//! Gatewatch API - a login service with brute-force and credential-stuffing
//! protection.
//!
//! Two cooperating subsystems defend the login endpoint:
//! - a real-time aggregator counting failed logins per source address,
//!   escalating to metric emission and a ban invocation once the failure
//!   threshold is crossed;
//! - a periodic batch correlator mining the durable suspicious-activity
//!   log over a sliding window, blacklisting aggressive addresses and
//!   identities attacked from many addresses.
//!
//! ## Architecture
//!
//! The codebase is organized into focused modules:
//! - `models/` - Data structures and request/response models
//! - `handlers/` - HTTP request handlers for each endpoint
//! - `services/` - The engine: ledger, escalation, background tasks
//! - `stores/` - Collaborator seams and their sqlite/HTTP/in-memory adapters
//! - `utils/` - Utility functions and helpers
//! - `config/` - Configuration structures and environment loading
//!
//! ## Quick Start
//!
//! ```no_run
//! use gatewatch_api::create_openapi_spec;
//!
//! let spec = create_openapi_spec();
//! // Wire an AppContext and serve create_app(&ctx)
//! ```

// Core modules
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod stores;
pub mod utils;

// Re-export commonly used types and functions for convenience
pub use config::{CorrelatorConfig, MetricsConfig, StoreConfig, ThresholdConfig};
pub use handlers::{
    AppContext, block_address, create_app, create_openapi_spec, get_metrics, health, index, login,
};
pub use models::{
    AddressBlockEntry, BlockRequest, BlockResponse, HealthResponse, IMMEDIATE_BLOCK_ATTEMPTS,
    IdentityBlockEntry, LogEvent, LoginAuditEvent, LoginEventType, LoginRequest, LoginResponse,
    QueryRow, QueryWindow, SuspiciousReport,
};
pub use services::{
    AttemptLedger, AttemptRecord, BatchCorrelator, CorrelationSummary, EscalationGate,
    FlushEmitter, LoginGate, LoginOutcome, MetricSink, SecurityMetrics, Sweeper,
};
pub use stores::{
    ActivityLogStore, BanTrigger, BlacklistStore, CredentialStore, FileCredentialStore,
    HttpBanTrigger, HttpWebhookSink, MemoryActivityLog, MemoryBlacklistStore,
    MemoryCredentialStore, QueryStatus, SqliteActivityLog, SqliteBlacklistStore, StoreError,
    WebhookSink, ensure_schema,
};
pub use utils::{extract_client_ip, extract_user_agent};
