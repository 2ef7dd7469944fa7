//! Authenticated request pipeline.
//!
//! This module handles:
//! - Service base URL normalization
//! - Outbound credential attachment
//! - Inbound failure classification and the 401 session hook

pub mod classify;
pub mod client;
pub mod endpoint;

pub use classify::{classify_status, classify_transport, extract_message};
pub use client::{ApiClient, ApiResponse};
pub use endpoint::{Service, ServiceEndpoint};
