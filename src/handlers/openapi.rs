//! OpenAPI specification generation and app factory.

use crate::{
    config::MetricsConfig,
    handlers::{block_address, get_metrics, health, index, login},
    services::{BatchCorrelator, LoginGate, SecurityMetrics},
};
use actix_web::App;
use paperclip::actix::{OpenApiExt, web};
use paperclip::v2::models::{DefaultApiRaw, Info};
use std::sync::Arc;

/// Shared request-handling state handed to the app factory.
///
/// Cloned into each worker; all heavy members are reference-counted.
#[derive(Clone)]
pub struct AppContext {
    pub login_gate: Arc<LoginGate>,
    pub correlator: Arc<BatchCorrelator>,
    pub metrics: SecurityMetrics,
    pub metrics_config: MetricsConfig,
}

/// Creates the shared OpenAPI specification for the API
pub fn create_openapi_spec() -> DefaultApiRaw {
    DefaultApiRaw {
        info: Info {
            title: "Gatewatch API".into(),
            version: "1.0.0".into(),
            description: Some(
                "Login service with brute-force and credential-stuffing protection.\n\n\
                Failed logins are aggregated per source address in real time; addresses \
                crossing the failure threshold are escalated to a metric emission and a \
                ban invocation. A periodic batch correlation over the durable \
                suspicious-activity log commits longer-lived blacklist decisions for \
                aggressive addresses and for identities targeted from many addresses.\n\
                \n\
                **Endpoints:**\n\
                - `POST /api/login`: authenticate, enforcing both blacklists\n\
                - `POST /api/block`: immediately blacklist an address, bypassing correlation\n\
                - `GET /api/metrics`: Prometheus metrics\n\
                - `GET /api/health`: health probe"
                    .into(),
            ),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Creates the application with shared configuration
///
/// This factory wires the handlers against an [`AppContext`] and is used
/// both by the server binary and the integration tests.
pub fn create_app(
    ctx: &AppContext,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    App::new()
        .wrap_api_with_spec(create_openapi_spec())
        .app_data(web::Data::from(Arc::clone(&ctx.login_gate)))
        .app_data(web::Data::from(Arc::clone(&ctx.correlator)))
        .app_data(web::Data::new(ctx.metrics.clone()))
        .app_data(web::Data::new(ctx.metrics_config.clone()))
        .service(web::resource("/").route(web::get().to(index)))
        .service(web::resource("/api/health").route(web::get().to(health)))
        .service(web::resource("/api/metrics").route(web::get().to(get_metrics)))
        .service(web::resource("/api/login").route(web::post().to(login)))
        .service(web::resource("/api/block").route(web::post().to(block_address)))
        .with_json_spec_at("/api/spec/v2")
        .build()
}
