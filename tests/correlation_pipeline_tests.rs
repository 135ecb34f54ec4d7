//! End-to-end pipeline tests: login failures flow through the ledger and
//! flush emitter into the activity log, and batch correlation turns them
//! into durable blacklist decisions that the login gate then enforces.

use chrono::Duration;
use gatewatch_api::{
    ActivityLogStore, AttemptLedger, BanTrigger, BatchCorrelator, BlacklistStore,
    CorrelatorConfig, CredentialStore, EscalationGate, FlushEmitter, HttpBanTrigger,
    HttpWebhookSink, LoginGate, LoginOutcome, MemoryActivityLog, MemoryBlacklistStore,
    MemoryCredentialStore, MetricSink, QueryWindow, SecurityMetrics, WebhookSink,
};
use std::sync::Arc;

struct Pipeline {
    gate: LoginGate,
    flusher: FlushEmitter,
    correlator: BatchCorrelator,
    ledger: Arc<AttemptLedger>,
    blacklist: Arc<MemoryBlacklistStore>,
    activity_log: Arc<MemoryActivityLog>,
}

fn pipeline() -> Pipeline {
    let blacklist = Arc::new(MemoryBlacklistStore::new());
    let credentials = Arc::new(MemoryCredentialStore::new().with_user("admin", "password123"));
    let activity_log = Arc::new(MemoryActivityLog::new());
    let ledger = Arc::new(AttemptLedger::new());
    let metrics = SecurityMetrics::new().expect("metrics registry");

    let escalation = Arc::new(EscalationGate::new(
        Arc::clone(&ledger),
        Arc::new(metrics) as Arc<dyn MetricSink>,
        Arc::new(HttpBanTrigger::new(None).expect("ban trigger")) as Arc<dyn BanTrigger>,
        10,
    ));
    let gate = LoginGate::new(
        Arc::clone(&blacklist) as Arc<dyn BlacklistStore>,
        credentials as Arc<dyn CredentialStore>,
        Arc::clone(&ledger),
        escalation,
    );
    let flusher = FlushEmitter::new(
        Arc::clone(&ledger),
        Arc::clone(&activity_log) as Arc<dyn ActivityLogStore>,
        Arc::new(HttpWebhookSink::new(None).expect("webhook sink")) as Arc<dyn WebhookSink>,
        10,
        30,
    );
    let correlator = BatchCorrelator::new(
        Arc::clone(&activity_log) as Arc<dyn ActivityLogStore>,
        Arc::clone(&blacklist) as Arc<dyn BlacklistStore>,
        CorrelatorConfig {
            poll_interval_secs: 0,
            ..CorrelatorConfig::default()
        },
    );

    Pipeline {
        gate,
        flusher,
        correlator,
        ledger,
        blacklist,
        activity_log,
    }
}

#[tokio::test]
async fn a_single_aggressive_address_ends_up_durably_banned() {
    let p = pipeline();

    for _ in 0..12 {
        let outcome = p
            .gate
            .authenticate("198.51.100.1", "admin", "wrong")
            .await
            .unwrap();
        assert_eq!(outcome, LoginOutcome::InvalidCredential);
    }

    // Real-time escalation already claimed both side effects.
    let record = p.ledger.get("198.51.100.1").unwrap();
    assert!(record.metric_emitted);
    assert!(record.ban_triggered);

    // The flusher drains the record into the durable log and clears it.
    assert_eq!(p.flusher.flush_once().await, 1);
    assert_eq!(p.activity_log.event_count(), 1);
    assert!(p.ledger.is_empty());

    // Correlation over the window commits the durable ban.
    let summary = p.correlator.correlate_window(QueryWindow::trailing(600)).await;
    assert_eq!(summary.addresses_blocked, 1);
    assert_eq!(p.blacklist.address_entry("198.51.100.1").unwrap().attempts, 12);

    // The login gate now refuses the address before any credential work.
    let outcome = p
        .gate
        .authenticate("198.51.100.1", "admin", "password123")
        .await
        .unwrap();
    assert_eq!(outcome, LoginOutcome::BlockedAddress);
}

#[tokio::test]
async fn a_distributed_spray_on_one_identity_bans_the_identity() {
    let p = pipeline();

    for address in ["1.1.1.1", "2.2.2.2", "3.3.3.3"] {
        for _ in 0..11 {
            p.gate.authenticate(address, "admin", "guess").await.unwrap();
        }
    }

    assert_eq!(p.flusher.flush_once().await, 3);
    assert_eq!(p.activity_log.event_count(), 3);

    let window = QueryWindow::trailing(600);
    let summary = p.correlator.correlate_window(window).await;
    assert_eq!(summary.addresses_blocked, 3);
    assert_eq!(summary.identities_blocked, 1);

    let entry = p.blacklist.identity_entry("admin").unwrap();
    assert_eq!(entry.address_count, 3);
    assert_eq!(entry.expire_at, window.end + Duration::seconds(600));

    // Even a fresh address with the right password is refused while the
    // identity ban is live.
    let outcome = p
        .gate
        .authenticate("4.4.4.4", "admin", "password123")
        .await
        .unwrap();
    assert_eq!(outcome, LoginOutcome::BlockedIdentity);
}

#[tokio::test]
async fn quiet_addresses_never_reach_the_durable_log() {
    let p = pipeline();

    for _ in 0..5 {
        p.gate
            .authenticate("198.51.100.1", "admin", "wrong")
            .await
            .unwrap();
    }

    assert_eq!(p.flusher.flush_once().await, 0);
    assert_eq!(p.activity_log.event_count(), 0);
    // The entry stays in the ledger, still accumulating.
    assert_eq!(p.ledger.get("198.51.100.1").unwrap().failure_count, 5);

    let summary = p.correlator.correlate_window(QueryWindow::trailing(600)).await;
    assert_eq!(summary.addresses_blocked, 0);
    assert_eq!(summary.identities_blocked, 0);
}
