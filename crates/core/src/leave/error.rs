//! Leave error types.
//!
//! Every repository operation returns one of these instead of a bare
//! `false`/`None`, so callers can tell "does not exist" apart from
//! "invalid input" and "storage failed".

use chrono::NaiveDate;
use hris_shared::AppError;
use hris_shared::types::{EmployeeId, LeaveBalanceId, LeaveRequestId, LeaveTypeId};
use thiserror::Error;

use crate::leave::balance::BalanceKey;
use crate::leave::request::ApprovalStatus;

/// Errors that can occur during leave operations.
#[derive(Debug, Error)]
pub enum LeaveError {
    /// Input failed validation before any storage access.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A day count that must be positive was not.
    #[error("Leave days must be positive, got {0}")]
    InvalidDays(i32),

    /// Leave start is after leave end.
    #[error("Leave start {start} is after leave end {end}")]
    InvalidDateRange {
        /// First day of leave.
        start: NaiveDate,
        /// Last day of leave.
        end: NaiveDate,
    },

    /// No balance row exists for the key.
    #[error(
        "No leave balance for employee {employee_id}, leave type {leave_type_id}, year {year}"
    )]
    BalanceNotFound {
        /// Employee.
        employee_id: EmployeeId,
        /// Leave type.
        leave_type_id: LeaveTypeId,
        /// Balance year.
        year: i32,
    },

    /// No balance row exists with this surrogate key.
    #[error("Leave balance {0} not found")]
    BalanceIdNotFound(LeaveBalanceId),

    /// Leave request not found.
    #[error("Leave request {0} not found")]
    RequestNotFound(LeaveRequestId),

    /// Not enough remaining days for the deduction.
    #[error("Insufficient leave balance: requested {requested}, remaining {remaining}")]
    InsufficientBalance {
        /// Days requested.
        requested: i32,
        /// Days remaining on the balance.
        remaining: i32,
    },

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: ApprovalStatus,
        /// The attempted target status.
        to: ApprovalStatus,
    },

    /// Request already carries a terminal decision.
    #[error("Leave request {id} is already {status}")]
    AlreadyDecided {
        /// The request.
        id: LeaveRequestId,
        /// Its terminal status.
        status: ApprovalStatus,
    },

    /// Rejection notes are required but blank.
    #[error("Rejection notes are required")]
    RejectionNotesRequired,

    /// Two balances describing different keys were reconciled.
    #[error("Cannot reconcile balances with different keys: {left} and {right}")]
    KeyMismatch {
        /// Key of the receiving balance.
        left: BalanceKey,
        /// Key of the other balance.
        right: BalanceKey,
    },

    /// The request collides with approved leave of the same employee.
    #[error("Leave request overlaps approved leave request(s) {conflicting:?}")]
    OverlapsApprovedLeave {
        /// Ids of the approved requests it overlaps.
        conflicting: Vec<LeaveRequestId>,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),
}

impl LeaveError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidDays(_) => "INVALID_DAYS",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::BalanceNotFound { .. } | Self::BalanceIdNotFound(_) => "BALANCE_NOT_FOUND",
            Self::RequestNotFound(_) => "REQUEST_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::AlreadyDecided { .. } => "ALREADY_DECIDED",
            Self::RejectionNotesRequired => "REJECTION_NOTES_REQUIRED",
            Self::KeyMismatch { .. } => "KEY_MISMATCH",
            Self::OverlapsApprovedLeave { .. } => "OVERLAPS_APPROVED_LEAVE",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// True when the requested entity does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BalanceNotFound { .. } | Self::BalanceIdNotFound(_) | Self::RequestNotFound(_)
        )
    }

    /// True when the input was rejected before touching storage.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_)
                | Self::InvalidDays(_)
                | Self::InvalidDateRange { .. }
                | Self::RejectionNotesRequired
                | Self::KeyMismatch { .. }
        )
    }

    /// True when the storage layer failed.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

impl From<LeaveError> for AppError {
    fn from(err: LeaveError) -> Self {
        let message = err.to_string();
        match err {
            LeaveError::BalanceNotFound { .. }
            | LeaveError::BalanceIdNotFound(_)
            | LeaveError::RequestNotFound(_) => Self::NotFound(message),
            LeaveError::Validation(_)
            | LeaveError::InvalidDays(_)
            | LeaveError::InvalidDateRange { .. }
            | LeaveError::RejectionNotesRequired
            | LeaveError::KeyMismatch { .. } => Self::Validation(message),
            LeaveError::InsufficientBalance { .. }
            | LeaveError::InvalidTransition { .. }
            | LeaveError::AlreadyDecided { .. } => Self::BusinessRule(message),
            LeaveError::OverlapsApprovedLeave { .. } => Self::Conflict(message),
            LeaveError::Database(inner) => Self::Database(inner),
        }
    }
}
