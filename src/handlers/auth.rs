//! Login endpoint handler.

use crate::{
    models::{
        audit::{LoginAuditEvent, LoginEventType},
        auth::{LoginRequest, LoginResponse},
    },
    services::{LoginGate, LoginOutcome, SecurityMetrics},
    utils::http::{extract_client_ip, extract_user_agent},
};
use actix_web::{Error, HttpRequest, Result, web};
use paperclip::actix::api_v2_operation;
use tracing::error;

fn rejection(message: &str) -> String {
    serde_json::json!({ "success": false, "message": message }).to_string()
}

/// User login endpoint
///
/// Checks the caller address against the address blacklist, the username
/// against the identity blacklist, and finally the credential itself.
/// Failed credentials feed the suspicious-activity ledger.
#[api_v2_operation(
    summary = "User Login",
    description = "Authenticate a user, enforcing address and identity blacklists",
    tags("Authentication"),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = LoginResponse),
        (status = 403, description = "Caller address or username is blocked", body = LoginResponse)
    )
)]
pub async fn login(
    req: HttpRequest,
    payload: web::Json<LoginRequest>,
    gate: web::Data<LoginGate>,
    metrics: web::Data<SecurityMetrics>,
) -> Result<web::Json<LoginResponse>, Error> {
    let address = extract_client_ip(&req);
    let user_agent = extract_user_agent(&req);
    let endpoint = req.uri().path().to_string();

    let outcome = gate
        .authenticate(&address, &payload.username, &payload.password)
        .await
        .map_err(|err| {
            // Collaborator detail never leaks to the caller.
            error!(address = %address, error = %err, "login processing failed");
            actix_web::error::ErrorInternalServerError("Unable to process login.")
        })?;

    let (event_type, result) = match outcome {
        LoginOutcome::Accepted => (
            LoginEventType::LoginSuccess,
            Ok(web::Json(LoginResponse {
                success: true,
                message: "Login successful.".to_string(),
            })),
        ),
        LoginOutcome::BlockedAddress => {
            metrics.record_rejection("blocked_address");
            (
                LoginEventType::AddressBlocked,
                Err(actix_web::error::ErrorForbidden(rejection(
                    "Address is blocked.",
                ))),
            )
        }
        LoginOutcome::BlockedIdentity => {
            metrics.record_rejection("blocked_identity");
            (
                LoginEventType::IdentityBlocked,
                Err(actix_web::error::ErrorForbidden(rejection(
                    "Username is blocked.",
                ))),
            )
        }
        LoginOutcome::InvalidCredential => {
            metrics.record_rejection("invalid_credential");
            (
                LoginEventType::LoginFailure,
                Err(actix_web::error::ErrorUnauthorized(rejection(
                    "Invalid credentials.",
                ))),
            )
        }
    };

    LoginAuditEvent::new(event_type, address, endpoint)
        .with_identity(Some(payload.username.clone()))
        .with_user_agent(user_agent)
        .log();

    result
}
