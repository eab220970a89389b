//! Shared types, errors, configuration, and time for the HRIS leave subsystem.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for type-safe entity references
//! - Application-wide error types
//! - Configuration management
//! - An injectable clock rendering time in the configured civil timezone

pub mod clock;
pub mod config;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, ZonedClock};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
