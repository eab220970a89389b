//! Core business logic for the HRIS leave subsystem.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here; the `hris-db`
//! crate persists them.
//!
//! # Modules
//!
//! - `leave` - Leave balances, leave requests, approval workflow, overlap checks

pub mod leave;
