//! HTTP request handlers for API endpoints.
//!
//! This module contains all the HTTP request handlers that process
//! incoming requests and generate responses.

pub mod auth;
pub mod block;
pub mod health;
pub mod metrics;
pub mod openapi;
pub mod pages;

pub use auth::*;
pub use block::*;
pub use health::*;
pub use metrics::*;
pub use openapi::*;
pub use pages::*;
