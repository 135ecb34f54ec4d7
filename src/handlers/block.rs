//! Immediate out-of-band block endpoint handler.

use crate::{
    models::{
        audit::{LoginAuditEvent, LoginEventType},
        auth::{BlockRequest, BlockResponse},
    },
    services::BatchCorrelator,
    utils::http::extract_client_ip,
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;
use tracing::error;

/// Immediate address block endpoint
///
/// Writes the address to the durable blacklist unconditionally, bypassing
/// correlation. Intended for manual or upstream-signaled blocks.
#[api_v2_operation(
    summary = "Immediate Address Block",
    description = "Unconditionally add an address to the durable blacklist",
    tags("Blacklist"),
    responses(
        (status = 200, description = "Address blocked", body = BlockResponse),
        (status = 500, description = "Block could not be recorded")
    )
)]
pub async fn block_address(
    req: HttpRequest,
    payload: web::Json<BlockRequest>,
    correlator: web::Data<BatchCorrelator>,
) -> Result<web::Json<BlockResponse>, Error> {
    correlator
        .block_address_now(&payload.address)
        .await
        .map_err(|err| {
            error!(address = %payload.address, error = %err, "immediate block failed");
            actix_web::error::ErrorInternalServerError("Unable to record block.")
        })?;

    LoginAuditEvent::new(
        LoginEventType::ImmediateBlock,
        payload.address.clone(),
        req.uri().path().to_string(),
    )
    .log();
    // The caller address is logged separately from the blocked address.
    tracing::info!(
        blocked = %payload.address,
        caller = %extract_client_ip(&req),
        "immediate block accepted"
    );

    Ok(web::Json(BlockResponse {
        blocked: true,
        address: payload.address.clone(),
    }))
}
