//! Login and block request/response models.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};

/// Request model for user login
#[derive(Serialize, Deserialize, Apiv2Schema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response model for login attempts
#[derive(Serialize, Deserialize, Apiv2Schema)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

/// Request model for the immediate block endpoint
#[derive(Serialize, Deserialize, Apiv2Schema)]
pub struct BlockRequest {
    pub address: String,
}

/// Response model for the immediate block endpoint
#[derive(Serialize, Deserialize, Apiv2Schema)]
pub struct BlockResponse {
    pub blocked: bool,
    pub address: String,
}
