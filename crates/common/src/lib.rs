//! Inkpress Common Library
//!
//! Shared code for the Inkpress blog backend including:
//! - Domain types and request payloads
//! - Database models and repository patterns
//! - Referential validation and content services
//! - Listing filters and pagination
//! - Backup archive export
//! - Error types and handling
//! - Configuration management
//! - Authentication utilities
//! - Metrics and observability

pub mod auth;
pub mod backup;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod metrics;
pub mod pagination;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use services::Services;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
