//! Staff administration client for the TechFix backend services.
//!
//! Three resource services (inventory components, quotations, orders) and an
//! authentication service sit behind one authenticated request pipeline:
//!
//! ```text
//! view ──► ResourceClient ──► ApiClient ──► backend
//!                              │   ▲
//!               Bearer <token> │   │ 2xx body | ApiError
//!                              ▼   │
//!                             Session
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Error taxonomy
//! - [`session`]: Credential storage
//! - [`pipeline`]: Request decoration and response classification
//! - [`auth`]: Login, logout and registration
//! - [`resources`]: Record types and CRUD clients
//! - [`views`]: List, detail and form state
//! - [`metrics`]: Request counters and latency

pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod resources;
pub mod session;
pub mod views;

pub use config::Config;
pub use error::{AdminError, ApiError, Result};
