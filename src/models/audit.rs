//! Structured audit events for login-security decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Types of login-security events for audit logging
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginEventType {
    LoginSuccess,
    LoginFailure,
    AddressBlocked,
    IdentityBlocked,
    ImmediateBlock,
}

/// Structured audit log entry for login-security events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAuditEvent {
    pub event_type: LoginEventType,
    pub timestamp: DateTime<Utc>,
    pub address: String,
    pub identity: Option<String>,
    pub user_agent: Option<String>,
    pub endpoint: String,
}

impl LoginAuditEvent {
    /// Create a new audit event with basic information
    pub fn new(event_type: LoginEventType, address: String, endpoint: String) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            address,
            identity: None,
            user_agent: None,
            endpoint,
        }
    }

    /// Add the identity under authentication
    pub fn with_identity(mut self, identity: Option<String>) -> Self {
        self.identity = identity;
        self
    }

    /// Add user agent information
    pub fn with_user_agent(mut self, user_agent: Option<String>) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Log the audit event using structured logging
    pub fn log(&self) {
        info!(
            target: "login_audit",
            event_type = ?self.event_type,
            timestamp = %self.timestamp,
            address = %self.address,
            identity = ?self.identity,
            user_agent = ?self.user_agent,
            endpoint = %self.endpoint,
            "Login security audit event"
        );
    }
}
