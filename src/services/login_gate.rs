//! Request-path login orchestration.

use crate::services::escalation::EscalationGate;
use crate::services::ledger::AttemptLedger;
use crate::stores::{BlacklistStore, CredentialStore, StoreError};
use std::sync::Arc;

/// Outcome of one authentication attempt as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    BlockedAddress,
    BlockedIdentity,
    InvalidCredential,
}

/// Entry point for every login request.
///
/// Checks run in order: address blacklist, identity blacklist, credential
/// validation. A blacklisted caller is rejected before any credential work
/// and without touching the ledger, so an already-banned address stops
/// growing its counters. Only failed credential checks feed the ledger and
/// the escalation gate.
pub struct LoginGate {
    blacklist: Arc<dyn BlacklistStore>,
    credentials: Arc<dyn CredentialStore>,
    ledger: Arc<AttemptLedger>,
    escalation: Arc<EscalationGate>,
}

impl LoginGate {
    pub fn new(
        blacklist: Arc<dyn BlacklistStore>,
        credentials: Arc<dyn CredentialStore>,
        ledger: Arc<AttemptLedger>,
        escalation: Arc<EscalationGate>,
    ) -> Self {
        Self {
            blacklist,
            credentials,
            ledger,
            escalation,
        }
    }

    /// Authenticate one request. Collaborator errors bubble up to the
    /// handler, which maps them to a generic unable-to-process response.
    pub async fn authenticate(
        &self,
        address: &str,
        identity: &str,
        credential: &str,
    ) -> Result<LoginOutcome, StoreError> {
        if self.blacklist.is_address_blocked(address).await? {
            return Ok(LoginOutcome::BlockedAddress);
        }
        if self.blacklist.is_identity_blocked(identity).await? {
            return Ok(LoginOutcome::BlockedIdentity);
        }

        if self.credentials.verify(identity, credential).await? {
            // Successful logins leave no trace in the ledger.
            return Ok(LoginOutcome::Accepted);
        }

        let record = self.ledger.record_failure(address, identity);
        self.escalation.on_failure(&record).await;
        Ok(LoginOutcome::InvalidCredential)
    }
}
