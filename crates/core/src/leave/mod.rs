//! Leave balances and leave requests.
//!
//! This module implements balance arithmetic, the two reconciliation
//! policies for balance rows sharing one key, the leave request model with
//! its approval state machine, and overlap detection between requests.
//!
//! # Modules
//!
//! - `balance` - Balance record, arithmetic, merge and conflict overlay
//! - `request` - Leave request model and approval status
//! - `workflow` - Pending → Approved/Rejected transitions
//! - `overlap` - Inclusive date-range overlap checks
//! - `error` - Leave-specific error types

pub mod balance;
pub mod error;
pub mod overlap;
pub mod request;
pub mod workflow;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod workflow_props;

pub use balance::{BalanceKey, LeaveBalance, MAX_LEAVE_DAYS, merge_duplicates};
pub use error::LeaveError;
pub use overlap::{approved_conflicts, has_conflict_with_approved, overlapping_requests, ranges_overlap};
pub use request::{ApprovalStatus, LeaveRequest, NewLeaveRequest};
pub use workflow::{LeaveDecision, LeaveWorkflow};
