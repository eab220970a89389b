//! `SeaORM` entities for the leave tables.
//!
//! Column names are the camelCase wire contract shared with the rest of
//! the HRIS schema, so every field carries an explicit `column_name`.

pub mod leave_approval_log;
pub mod leave_balance;
pub mod leave_request;
