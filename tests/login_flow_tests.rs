use actix_web::{http::StatusCode, test};
use chrono::{Duration, Utc};
use gatewatch_api::{
    ActivityLogStore, AddressBlockEntry, AppContext, AttemptLedger, BanTrigger, BatchCorrelator,
    BlacklistStore, CorrelatorConfig, CredentialStore, EscalationGate, HttpBanTrigger,
    IdentityBlockEntry, LoginGate, MemoryActivityLog, MemoryBlacklistStore, MemoryCredentialStore,
    MetricSink, MetricsConfig, SecurityMetrics, create_app,
};
use std::sync::Arc;

/// Build an app context over in-memory collaborators, returning the
/// blacklist handle so tests can seed and inspect it.
fn test_context() -> (AppContext, Arc<MemoryBlacklistStore>) {
    let blacklist = Arc::new(MemoryBlacklistStore::new());
    let credentials = Arc::new(MemoryCredentialStore::new().with_user("admin", "password123"));
    let activity_log = Arc::new(MemoryActivityLog::new());
    let metrics = SecurityMetrics::new().expect("metrics registry");
    let ledger = Arc::new(AttemptLedger::new());
    // An unconfigured ban trigger is a logged no-op; no network I/O in tests.
    let ban = Arc::new(HttpBanTrigger::new(None).expect("ban trigger")) as Arc<dyn BanTrigger>;
    let escalation = Arc::new(EscalationGate::new(
        Arc::clone(&ledger),
        Arc::new(metrics.clone()) as Arc<dyn MetricSink>,
        ban,
        10,
    ));
    let login_gate = Arc::new(LoginGate::new(
        Arc::clone(&blacklist) as Arc<dyn BlacklistStore>,
        credentials as Arc<dyn CredentialStore>,
        ledger,
        escalation,
    ));
    let correlator = Arc::new(BatchCorrelator::new(
        activity_log as Arc<dyn ActivityLogStore>,
        Arc::clone(&blacklist) as Arc<dyn BlacklistStore>,
        CorrelatorConfig::default(),
    ));

    (
        AppContext {
            login_gate,
            correlator,
            metrics,
            metrics_config: MetricsConfig::default(),
        },
        blacklist,
    )
}

#[actix_web::test]
async fn index_serves_the_login_page() {
    let (ctx, _) = test_context();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body_str = std::str::from_utf8(&body).unwrap();
    assert!(body_str.contains("Sign In"));
}

#[actix_web::test]
async fn health_endpoint_reports_healthy() {
    let (ctx, _) = test_context();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).unwrap().contains("healthy"));
}

#[actix_web::test]
async fn valid_credentials_log_in() {
    let (ctx, _) = test_context();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(serde_json::json!({"username": "admin", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["success"], true);
}

#[actix_web::test]
async fn invalid_credentials_are_unauthorized() {
    let (ctx, _) = test_context();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(serde_json::json!({"username": "admin", "password": "nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["message"], "Invalid credentials.");
}

#[actix_web::test]
async fn blacklisted_address_is_rejected_despite_correct_credentials() {
    let (ctx, blacklist) = test_context();
    blacklist
        .put_address(&AddressBlockEntry {
            address: "198.51.100.7".to_string(),
            attempts: 12,
            blocked_at: Utc::now(),
        })
        .await
        .unwrap();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("X-Forwarded-For", "198.51.100.7"))
        .set_json(serde_json::json!({"username": "admin", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body = test::read_body(resp).await;
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["message"], "Address is blocked.");
}

#[actix_web::test]
async fn blacklisted_identity_is_rejected_until_expiry() {
    let (ctx, blacklist) = test_context();
    blacklist
        .put_identity(&IdentityBlockEntry {
            identity: "admin".to_string(),
            address_count: 3,
            blocked_at: Utc::now(),
            expire_at: Utc::now() + Duration::seconds(600),
        })
        .await
        .unwrap();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(serde_json::json!({"username": "admin", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Replace with an already-expired entry: the store stops returning it
    // and the login goes through.
    blacklist
        .put_identity(&IdentityBlockEntry {
            identity: "admin".to_string(),
            address_count: 3,
            blocked_at: Utc::now() - Duration::seconds(1200),
            expire_at: Utc::now() - Duration::seconds(1),
        })
        .await
        .unwrap();

    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(serde_json::json!({"username": "admin", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn immediate_block_endpoint_bans_the_address() {
    let (ctx, blacklist) = test_context();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/block")
        .set_json(serde_json::json!({"address": "192.0.2.99"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(json["blocked"], true);
    assert_eq!(json["address"], "192.0.2.99");

    let entry = blacklist.address_entry("192.0.2.99").unwrap();
    assert_eq!(entry.attempts, 999);

    // Subsequent logins from that address are refused.
    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("X-Forwarded-For", "192.0.2.99"))
        .set_json(serde_json::json!({"username": "admin", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn metrics_endpoint_exposes_rejection_counters() {
    let (ctx, _) = test_context();
    let app = test::init_service(create_app(&ctx)).await;

    let req = test::TestRequest::post()
        .uri("/api/login")
        .insert_header(("X-Forwarded-For", "203.0.113.5"))
        .set_json(serde_json::json!({"username": "admin", "password": "nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get().uri("/api/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = test::read_body(resp).await;
    let body_str = std::str::from_utf8(&body).unwrap();
    assert!(body_str.contains("logins_rejected_total"));
    assert!(body_str.contains("invalid_credential"));
}
