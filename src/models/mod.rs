//! Data models and schemas for the Gatewatch API.
//!
//! This module contains the data structures used throughout the application,
//! including request/response models, blacklist entries, activity records,
//! and audit types.

pub mod activity;
pub mod api;
pub mod audit;
pub mod auth;
pub mod blacklist;

pub use activity::*;
pub use api::*;
pub use audit::*;
pub use auth::*;
pub use blacklist::*;
