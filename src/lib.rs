//! # Vaultbase
//!
//! Multi-tenant gateway for proxied cache and storage capabilities.
//! Accounts provision named projects; each project carries one signed API
//! key whose capabilities gate access to the downstream service.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod logging;
pub mod management;
pub mod proxy;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{GatewayError, Result};
