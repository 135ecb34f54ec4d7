use actix_web::HttpServer;
use gatewatch_api::{
    AppContext, AttemptLedger, BatchCorrelator, CorrelatorConfig, EscalationGate, FileCredentialStore,
    FlushEmitter, HttpBanTrigger, HttpWebhookSink, LoginGate, MetricsConfig, SecurityMetrics,
    SqliteActivityLog, SqliteBlacklistStore, StoreConfig, Sweeper, ThresholdConfig, create_app,
    ensure_schema,
};
use gatewatch_api::{ActivityLogStore, BanTrigger, BlacklistStore, MetricSink, WebhookSink};
use sqlx::SqlitePool;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let store_config = StoreConfig::from_env();
    let thresholds = ThresholdConfig::from_env();
    let correlator_config = CorrelatorConfig::from_env();
    let metrics_config = MetricsConfig::from_env();

    let pool = SqlitePool::connect(&store_config.database_url)
        .await
        .map_err(io::Error::other)?;
    ensure_schema(&pool).await.map_err(io::Error::other)?;

    let blacklist: Arc<dyn BlacklistStore> = Arc::new(SqliteBlacklistStore::new(pool.clone()));
    let activity_log: Arc<dyn ActivityLogStore> = Arc::new(SqliteActivityLog::new(pool));
    let credentials = Arc::new(FileCredentialStore::new(&store_config.users_path));
    let ban: Arc<dyn BanTrigger> = Arc::new(
        HttpBanTrigger::new(store_config.ban_endpoint.clone()).map_err(io::Error::other)?,
    );
    let webhook: Arc<dyn WebhookSink> = Arc::new(
        HttpWebhookSink::new(store_config.webhook_endpoint.clone()).map_err(io::Error::other)?,
    );

    let metrics = SecurityMetrics::new().map_err(io::Error::other)?;
    let metric_sink: Arc<dyn MetricSink> = Arc::new(metrics.clone());

    let ledger = Arc::new(AttemptLedger::new());
    let escalation = Arc::new(EscalationGate::new(
        Arc::clone(&ledger),
        metric_sink,
        ban,
        thresholds.failure_threshold,
    ));
    let login_gate = Arc::new(LoginGate::new(
        Arc::clone(&blacklist),
        credentials,
        Arc::clone(&ledger),
        escalation,
    ));
    let correlator = Arc::new(BatchCorrelator::new(
        Arc::clone(&activity_log),
        blacklist,
        correlator_config,
    ));

    // Background tasks: each runs on its own period and never overlaps its
    // previous cycle. Shutdown simply stops scheduling further cycles.
    Arc::new(Sweeper::new(
        Arc::clone(&ledger),
        thresholds.inactivity_window_secs,
        thresholds.sweep_period_secs,
    ))
    .spawn();
    Arc::new(FlushEmitter::new(
        ledger,
        activity_log,
        webhook,
        thresholds.reporting_threshold,
        thresholds.flush_period_secs,
    ))
    .spawn();
    Arc::clone(&correlator).spawn();

    let ctx = AppContext {
        login_gate,
        correlator,
        metrics,
        metrics_config,
    };

    let bind = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    info!(bind = %bind, "gatewatch server starting");

    HttpServer::new(move || create_app(&ctx)).bind(bind)?.run().await
}
