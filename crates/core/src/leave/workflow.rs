//! Approval state machine for leave requests.
//!
//! ```text
//! Pending ──approve──▶ Approved
//!    └─────reject───▶ Rejected
//! ```
//!
//! Approved and Rejected are terminal: nothing re-opens a decided request.

use chrono::{DateTime, FixedOffset};
use hris_shared::types::ApproverId;

use crate::leave::error::LeaveError;
use crate::leave::request::ApprovalStatus;

/// A validated transition together with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveDecision {
    /// Pending request approved.
    Approve {
        /// The new status (Approved).
        new_status: ApprovalStatus,
        /// Who approved.
        approved_by: ApproverId,
        /// Decision timestamp.
        approved_at: DateTime<FixedOffset>,
        /// Optional supervisor notes.
        notes: Option<String>,
    },
    /// Pending request rejected.
    Reject {
        /// The new status (Rejected).
        new_status: ApprovalStatus,
        /// Who rejected.
        rejected_by: ApproverId,
        /// Decision timestamp.
        rejected_at: DateTime<FixedOffset>,
        /// Mandatory supervisor notes.
        notes: String,
    },
}

impl LeaveDecision {
    /// Returns the new status resulting from this decision.
    #[must_use]
    pub fn new_status(&self) -> ApprovalStatus {
        match self {
            Self::Approve { new_status, .. } | Self::Reject { new_status, .. } => *new_status,
        }
    }

    /// Who took the decision.
    #[must_use]
    pub fn decided_by(&self) -> ApproverId {
        match self {
            Self::Approve { approved_by, .. } => *approved_by,
            Self::Reject { rejected_by, .. } => *rejected_by,
        }
    }

    /// When the decision was taken.
    #[must_use]
    pub fn decided_at(&self) -> DateTime<FixedOffset> {
        match self {
            Self::Approve { approved_at, .. } => *approved_at,
            Self::Reject { rejected_at, .. } => *rejected_at,
        }
    }

    /// Supervisor notes, if any.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        match self {
            Self::Approve { notes, .. } => notes.as_deref(),
            Self::Reject { notes, .. } => Some(notes),
        }
    }

    /// Action label written to the approval log.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "APPROVED",
            Self::Reject { .. } => "REJECTED",
        }
    }
}

/// Stateless service validating leave request transitions.
pub struct LeaveWorkflow;

impl LeaveWorkflow {
    /// Approve a pending request.
    ///
    /// Blank notes are recorded as no notes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` if the request is not Pending.
    pub fn approve(
        current_status: ApprovalStatus,
        approved_by: ApproverId,
        notes: Option<String>,
        approved_at: DateTime<FixedOffset>,
    ) -> Result<LeaveDecision, LeaveError> {
        match current_status {
            ApprovalStatus::Pending => Ok(LeaveDecision::Approve {
                new_status: ApprovalStatus::Approved,
                approved_by,
                approved_at,
                notes: notes.filter(|n| !n.trim().is_empty()),
            }),
            _ => Err(LeaveError::InvalidTransition {
                from: current_status,
                to: ApprovalStatus::Approved,
            }),
        }
    }

    /// Reject a pending request.
    ///
    /// # Errors
    ///
    /// - `RejectionNotesRequired` if notes are blank (checked first)
    /// - `InvalidTransition` if the request is not Pending
    pub fn reject(
        current_status: ApprovalStatus,
        rejected_by: ApproverId,
        notes: String,
        rejected_at: DateTime<FixedOffset>,
    ) -> Result<LeaveDecision, LeaveError> {
        if notes.trim().is_empty() {
            return Err(LeaveError::RejectionNotesRequired);
        }

        match current_status {
            ApprovalStatus::Pending => Ok(LeaveDecision::Reject {
                new_status: ApprovalStatus::Rejected,
                rejected_by,
                rejected_at,
                notes,
            }),
            _ => Err(LeaveError::InvalidTransition {
                from: current_status,
                to: ApprovalStatus::Rejected,
            }),
        }
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
        matches!(
            (from, to),
            (
                ApprovalStatus::Pending,
                ApprovalStatus::Approved | ApprovalStatus::Rejected
            )
        )
    }
}
