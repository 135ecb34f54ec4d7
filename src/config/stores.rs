//! Collaborator endpoint and path configuration.

use std::env;

/// Locations of the durable stores and outbound collaborators.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Sqlite database backing the blacklist tables and activity log.
    pub database_url: String,
    /// JSON file mapping identities to credentials.
    pub users_path: String,
    /// Optional endpoint receiving suspicious-activity batches.
    pub webhook_endpoint: Option<String>,
    /// Optional endpoint invoked to enforce an address ban.
    pub ban_endpoint: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://gatewatch.db?mode=rwc".to_string(),
            users_path: "users.json".to_string(),
            webhook_endpoint: None,
            ban_endpoint: None,
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            users_path: env::var("USERS_PATH").unwrap_or(defaults.users_path),
            webhook_endpoint: env::var("PAYLOAD_ENDPOINT").ok().filter(|v| !v.is_empty()),
            ban_endpoint: env::var("BAN_ENDPOINT").ok().filter(|v| !v.is_empty()),
        }
    }
}
